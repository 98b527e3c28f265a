use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("chromium error: {0}")]
    Chromium(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("interaction failed: {0}")]
    Interaction(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

impl BrowserError {
    /// Whether another attempt might succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Launch(_) | Self::Chromium(_) | Self::Navigation(_) | Self::Timeout(_)
        )
    }
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::Chromium(err.to_string())
    }
}

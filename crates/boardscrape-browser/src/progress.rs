//! Rendering stages reported to whoever drives the terminal display.

use std::fmt;

/// One step of a render attempt, in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    /// Starting Chromium
    Launching,
    /// Loading the target URL
    Navigating,
    /// Waiting for client-side rendering to settle
    Waiting,
    /// Clicking header controls (only when interacting)
    Interacting,
    /// Capturing the final markup
    Capturing,
}

impl RenderStage {
    /// Status line shown for the stage.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Launching => "Launching browser...",
            Self::Navigating => "Navigating to page...",
            Self::Waiting => "Waiting for page to load...",
            Self::Interacting => "Clicking headers...",
            Self::Capturing => "Extracting HTML...",
        }
    }
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Receives stage updates during a render.
pub trait RenderProgress: Send + Sync {
    /// A new stage has started.
    fn stage(&self, stage: RenderStage);
}

/// Discards all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl RenderProgress for NoProgress {
    fn stage(&self, _stage: RenderStage) {}
}

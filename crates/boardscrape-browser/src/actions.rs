use crate::error::Result;
use std::time::Duration;

/// Page-level actions used while rendering
#[async_trait::async_trait]
pub trait PageActions {
    /// Navigate to a URL and wait for the load event, bounded by `timeout`
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait for a selector to appear, polling until `timeout`
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Click every element matching `selector` in document order.
    ///
    /// Individual click failures are logged and skipped. Returns the number
    /// of successful clicks; errors only when nothing matches.
    async fn click_all(&self, selector: &str, pause: Duration) -> Result<usize>;

    /// Serialized markup of the current document
    async fn content(&self) -> Result<String>;
}

use crate::actions::PageActions;
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use boardscrape_core::BrowserSettings;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures_util::stream::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Interval between selector polls while waiting for content
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser automation engine.
///
/// Holds launch settings only; every [`launch`](Self::launch) starts a fresh
/// Chromium process owned by the returned [`BrowserSession`].
#[derive(Debug, Clone)]
pub struct BrowserEngine {
    settings: BrowserSettings,
}

impl BrowserEngine {
    /// Create a new browser engine with the given settings
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    /// Launch settings
    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    /// Launch a browser with a single blank page
    pub async fn launch(&self) -> Result<BrowserSession> {
        let fingerprint = FingerprintConfig::from_settings(&self.settings);
        let config = self.browser_config(&fingerprint)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // Spawn browser handler
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {}", e);
                }
            }
        });

        // From here on the session owns the process, so any early return tears it down
        let mut session = BrowserSession {
            browser: Some(browser),
            page: None,
            handler: handler_task,
        };

        let page = session
            .browser
            .as_ref()
            .ok_or_else(|| BrowserError::Launch("browser vanished during launch".to_string()))?
            .new_page("about:blank")
            .await?;
        session.page = Some(page);

        tracing::debug!(
            "Launched browser ({}x{}, headless: {})",
            fingerprint.viewport_width,
            fingerprint.viewport_height,
            self.settings.headless
        );

        Ok(session)
    }

    fn browser_config(&self, fingerprint: &FingerprintConfig) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .request_timeout(self.settings.navigation_timeout())
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");

        if !self.settings.headless {
            builder = builder.with_head();
        }

        if let Some(path) = &self.settings.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        if let Some(user_agent) = &fingerprint.user_agent {
            builder = builder.arg(format!("--user-agent={user_agent}"));
        }

        builder.build().map_err(BrowserError::Launch)
    }
}

/// A running browser plus the page being rendered.
///
/// Call [`close`](Self::close) for an orderly shutdown. If the session is
/// dropped instead (early return, panic, cancelled future) the browser is
/// dropped with it, which kills the Chromium process.
pub struct BrowserSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| BrowserError::Chromium("session already closed".to_string()))
    }

    /// OS process id of the Chromium child, while it is still owned.
    pub fn process_id(&mut self) -> Option<u32> {
        self.browser
            .as_mut()?
            .get_mut_child()?
            .as_mut_inner()
            .id()
    }

    /// Close the page and the browser, then wait for the process to exit.
    pub async fn close(mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::debug!("page close failed: {}", e);
            }
        }

        if let Some(mut browser) = self.browser.take() {
            let closed = browser.close().await;
            let waited = browser.wait().await;
            closed?;
            waited.map_err(|e| BrowserError::Chromium(format!("waiting for exit: {e}")))?;
        }

        tracing::debug!("Browser closed");
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if self.browser.is_some() {
            tracing::warn!("Browser session dropped without close; killing browser process");
        }
        self.handler.abort();
    }
}

#[async_trait::async_trait]
impl PageActions for BrowserSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let page = self.page()?;

        let navigation = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<(), BrowserError>(())
        };

        match tokio::time::timeout(timeout, navigation).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::Navigation(format!("{url}: {e}"))),
            Err(_) => Err(BrowserError::Timeout(format!(
                "navigation to {url} exceeded {timeout:?}"
            ))),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let page = self.page()?;

        let poll = async {
            loop {
                if page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(timeout, poll).await.map_err(|_| {
            BrowserError::Timeout(format!("'{selector}' did not appear within {timeout:?}"))
        })
    }

    async fn click_all(&self, selector: &str, pause: Duration) -> Result<usize> {
        let page = self.page()?;

        let elements = page
            .find_elements(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;

        if elements.is_empty() {
            return Err(BrowserError::SelectorNotFound(selector.to_string()));
        }

        let mut clicked = 0;
        for (index, element) in elements.iter().enumerate() {
            if let Err(e) = element.scroll_into_view().await {
                tracing::debug!("scroll_into_view failed for {}[{}]: {}", selector, index, e);
            }

            match element.click().await {
                Ok(_) => {
                    clicked += 1;
                    tokio::time::sleep(pause).await;
                }
                Err(e) => {
                    let err = BrowserError::Interaction(format!("{selector}[{index}]: {e}"));
                    tracing::warn!("Skipping header control: {}", err);
                }
            }
        }

        Ok(clicked)
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page()?.content().await?)
    }
}

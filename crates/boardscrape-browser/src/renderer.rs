//! Page rendering: launch, navigate, settle, interact, capture.

use crate::actions::PageActions;
use crate::engine::BrowserEngine;
use crate::error::{BrowserError, Result};
use crate::progress::{RenderProgress, RenderStage};
use async_trait::async_trait;
use boardscrape_core::{BrowserSettings, InteractionConfig, RenderRequest, RenderedDocument};

/// Selector whose appearance marks the leaderboard as rendered.
const TABLE_SELECTOR: &str = "table";

/// Something that turns a URL into fully rendered markup.
///
/// One call is one attempt; retrying is the caller's concern.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render the requested page.
    async fn render(
        &self,
        request: &RenderRequest,
        progress: &dyn RenderProgress,
    ) -> Result<RenderedDocument>;
}

/// Renders pages in a fresh headless Chromium per call.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    engine: BrowserEngine,
    interaction: InteractionConfig,
}

impl ChromiumRenderer {
    /// Create a renderer from browser and interaction settings.
    pub fn new(settings: BrowserSettings, interaction: InteractionConfig) -> Self {
        Self {
            engine: BrowserEngine::new(settings),
            interaction,
        }
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(
        &self,
        request: &RenderRequest,
        progress: &dyn RenderProgress,
    ) -> Result<RenderedDocument> {
        let target = url::Url::parse(request.url())
            .map_err(|e| BrowserError::InvalidUrl(format!("{}: {e}", request.url())))?;
        tracing::debug!(
            host = target.host_str().unwrap_or_default(),
            interact = request.interact(),
            "Rendering page"
        );

        progress.stage(RenderStage::Launching);
        let session = self.engine.launch().await?;

        let outcome = drive(
            &session,
            request,
            self.engine.settings(),
            &self.interaction,
            progress,
        )
        .await;

        if let Err(e) = session.close().await {
            tracing::warn!("Browser did not shut down cleanly: {}", e);
        }

        outcome
    }
}

/// Run the render steps against an open page.
pub(crate) async fn drive<P>(
    page: &P,
    request: &RenderRequest,
    settings: &BrowserSettings,
    interaction: &InteractionConfig,
    progress: &dyn RenderProgress,
) -> Result<RenderedDocument>
where
    P: PageActions + Sync,
{
    progress.stage(RenderStage::Navigating);
    page.navigate(request.url(), settings.navigation_timeout())
        .await?;

    progress.stage(RenderStage::Waiting);
    match page
        .wait_for_selector(TABLE_SELECTOR, settings.render_timeout())
        .await
    {
        Ok(()) => tracing::debug!("Table element present"),
        Err(e) => tracing::warn!("Continuing without a rendered table: {}", e),
    }
    tokio::time::sleep(settings.settle_delay()).await;

    if request.interact() {
        progress.stage(RenderStage::Interacting);
        click_header_controls(page, interaction).await;
    }

    progress.stage(RenderStage::Capturing);
    let html = page.content().await?;
    if html.trim().is_empty() {
        return Err(BrowserError::Navigation(format!(
            "{} rendered an empty document",
            request.url()
        )));
    }

    Ok(RenderedDocument::new(html))
}

/// Best-effort clicks; every failure is logged and skipped.
async fn click_header_controls<P>(page: &P, interaction: &InteractionConfig)
where
    P: PageActions + Sync,
{
    for selector in &interaction.selectors {
        match page.click_all(selector, interaction.click_delay()).await {
            Ok(clicked) => tracing::info!("Clicked {} header control(s) for '{}'", clicked, selector),
            Err(e) => tracing::warn!("Header interaction '{}' skipped: {}", selector, e),
        }
    }
}

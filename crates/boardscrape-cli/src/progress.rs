//! Terminal spinner for render stages.

use boardscrape_browser::{RenderProgress, RenderStage};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Shows the current render stage next to a spinner.
pub struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(TICK);
        Self { bar }
    }

    /// A spinner that never draws.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    #[cfg(test)]
    pub fn message(&self) -> String {
        self.bar.message()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl RenderProgress for SpinnerProgress {
    fn stage(&self, stage: RenderStage) {
        self.bar.set_message(stage.message());
    }
}

impl Drop for SpinnerProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

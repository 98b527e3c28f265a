//! Headless browser rendering for JavaScript-driven pages.
//!
//! Launches a scoped Chromium instance per render, waits for client-side
//! rendering to settle, optionally clicks header controls, and captures the
//! final markup. The process is torn down on every exit path.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod progress;
pub mod renderer;

pub use actions::PageActions;
pub use engine::{BrowserEngine, BrowserSession};
pub use error::{BrowserError, Result};
pub use progress::{NoProgress, RenderProgress, RenderStage};
pub use renderer::{ChromiumRenderer, PageRenderer};

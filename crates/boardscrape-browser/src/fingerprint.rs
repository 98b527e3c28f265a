//! Browser fingerprint presented at launch.

use boardscrape_core::BrowserSettings;
use rand::Rng;

/// Desktop Chrome user agents picked from when randomizing.
const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Popular desktop resolutions.
const VIEWPORTS: [(u32, u32); 4] = [(1920, 1080), (1366, 768), (1536, 864), (1440, 900)];

/// User agent and window size presented by the launched browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintConfig {
    /// `None` keeps Chromium's own user agent
    pub user_agent: Option<String>,
    /// Window width in pixels
    pub viewport_width: u32,
    /// Window height in pixels
    pub viewport_height: u32,
}

impl FingerprintConfig {
    /// Pick a user agent and viewport at random.
    pub fn randomized() -> Self {
        let mut rng = rand::thread_rng();

        let user_agent = USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())];
        let (width, height) = VIEWPORTS[rng.gen_range(0..VIEWPORTS.len())];

        Self {
            user_agent: Some(user_agent.to_string()),
            viewport_width: width,
            viewport_height: height,
        }
    }

    /// Fingerprint described by the browser settings.
    pub fn from_settings(settings: &BrowserSettings) -> Self {
        if settings.randomize_fingerprint {
            Self::randomized()
        } else {
            Self {
                user_agent: None,
                viewport_width: settings.window_width,
                viewport_height: settings.window_height,
            }
        }
    }
}

use boardscrape_browser::{BrowserEngine, ChromiumRenderer, NoProgress, PageActions, PageRenderer};
use boardscrape_core::{BrowserSettings, InteractionConfig, RenderRequest};
use std::time::Duration;

const TABLE_PAGE: &str = "data:text/html,<table><thead><tr><th>Model</th></tr></thead><tbody><tr><td>GPT-5</td></tr></tbody></table>";

fn settings() -> BrowserSettings {
    BrowserSettings {
        settle_delay_ms: 0,
        render_timeout_secs: 5,
        ..BrowserSettings::default()
    }
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_browser_session_launch_and_close() {
    let engine = BrowserEngine::new(settings());
    let session = engine.launch().await.expect("launch browser");
    session.close().await.expect("close browser");
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_navigation_and_content() {
    let engine = BrowserEngine::new(settings());
    let session = engine.launch().await.unwrap();

    session
        .navigate(TABLE_PAGE, Duration::from_secs(10))
        .await
        .expect("navigate");
    session
        .wait_for_selector("table", Duration::from_secs(5))
        .await
        .expect("table present");

    let html = session.content().await.expect("content");
    assert!(html.contains("GPT-5"));

    session.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_renderer_tolerates_missing_header_controls() {
    let renderer = ChromiumRenderer::new(settings(), InteractionConfig::default());
    let request = RenderRequest::new(TABLE_PAGE, true);

    let doc = renderer
        .render(&request, &NoProgress)
        .await
        .expect("render despite no buttons");
    assert!(doc.as_str().contains("<td>GPT-5</td>"));
}

/// True once the process is gone or only a zombie awaiting reaping.
#[cfg(target_os = "linux")]
fn process_exited(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit_once(") ")
            .is_some_and(|(_, rest)| rest.starts_with('Z') || rest.starts_with('X')),
        Err(_) => true,
    }
}

#[cfg(target_os = "linux")]
async fn wait_for_exit(pid: u32) -> bool {
    for _ in 0..50 {
        if process_exited(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

#[cfg(target_os = "linux")]
#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_dropped_session_kills_chromium() {
    let engine = BrowserEngine::new(settings());
    let mut session = engine.launch().await.unwrap();
    let pid = session.process_id().expect("chromium pid");
    assert!(!process_exited(pid));

    drop(session);

    assert!(wait_for_exit(pid).await, "chromium {pid} outlived its session");
}

#[cfg(target_os = "linux")]
#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_cancelled_render_kills_chromium() {
    let engine = BrowserEngine::new(settings());
    let (pid_tx, pid_rx) = tokio::sync::oneshot::channel();

    let render = async move {
        let mut session = engine.launch().await.unwrap();
        let _ = pid_tx.send(session.process_id());
        session
            .navigate(TABLE_PAGE, Duration::from_secs(10))
            .await
            .unwrap();
        std::future::pending::<()>().await;
    };

    let cancelled = tokio::time::timeout(Duration::from_secs(8), render).await;
    assert!(cancelled.is_err());

    let pid = pid_rx.await.unwrap().expect("chromium pid");
    assert!(wait_for_exit(pid).await, "chromium {pid} outlived the cancelled render");
}

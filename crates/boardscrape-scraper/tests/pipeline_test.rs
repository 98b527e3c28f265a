use async_trait::async_trait;
use boardscrape_browser::{BrowserError, NoProgress, PageRenderer, RenderProgress};
use boardscrape_core::{AppConfig, ExtractionConfig, OutputFormat, RenderRequest, RenderedDocument};
use boardscrape_scraper::{
    Fetcher, Pipeline, RetryPolicy, ScrapeError, Sleeper, SnapshotWriter, TableExtractor,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const LEADERBOARD: &str = r#"
<html><body>
  <nav><table><tr><td>menu</td></tr></table></nav>
  <table>
    <thead>
      <tr><th>API Provider</th><th>Model</th><th>Output Speed</th><th>Price</th></tr>
    </thead>
    <tbody>
      <tr>
        <td><img alt="OpenAI" src="/logos/openai.svg"></td>
        <td><a href="/models/gpt-5">GPT-5</a></td>
        <td>152.3</td>
        <td>$3.44</td>
      </tr>
      <tr>
        <td><img src="/_next/image?url=%2Fimg%2Fgroq.png&amp;w=64"><span>Groq</span></td>
        <td>Llama 4 Maverick</td>
        <td>612.0</td>
      </tr>
    </tbody>
  </table>
</body></html>"#;

/// Fails transiently a fixed number of times, then serves `html`.
struct FlakyRenderer {
    failures: u32,
    html: &'static str,
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl PageRenderer for FlakyRenderer {
    async fn render(
        &self,
        _request: &RenderRequest,
        _progress: &dyn RenderProgress,
    ) -> boardscrape_browser::Result<RenderedDocument> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(BrowserError::Navigation("net::ERR_CONNECTION_RESET".to_string()));
        }
        Ok(RenderedDocument::new(self.html))
    }
}

struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

fn pipeline(
    html: &'static str,
    failures: u32,
    output: &std::path::Path,
) -> (Pipeline<FlakyRenderer, NoSleep>, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let renderer = FlakyRenderer {
        failures,
        html,
        calls: calls.clone(),
    };
    let fetcher = Fetcher::with_sleeper(
        renderer,
        RetryPolicy::new(3, Duration::from_secs(5)),
        NoSleep,
    );
    let pipeline = Pipeline::new(
        fetcher,
        TableExtractor::new(&ExtractionConfig::default()).unwrap(),
        SnapshotWriter::new(OutputFormat::Csv),
        RenderRequest::new("https://example.com/leaderboards/providers", true),
        output,
    );
    (pipeline, calls)
}

#[tokio::test]
async fn test_run_writes_leaderboard_csv() {
    let dir = TempDir::new().unwrap();
    let (pipeline, calls) = pipeline(LEADERBOARD, 2, &dir.path().join("out/leaderboard.csv"));

    let summary = pipeline.run(&NoProgress).await.expect("run succeeds");

    assert_eq!(summary.attempts, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.columns, 4);

    let name = summary.output.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("leaderboard_"));
    assert!(name.ends_with(".csv"));

    let mut reader = csv::Reader::from_path(&summary.output).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, ["API Provider", "Model", "Output Speed", "Price"]);
    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    assert_eq!(
        rows,
        vec![
            vec!["OpenAI", "GPT-5", "152.3", "$3.44"],
            vec!["groq", "Llama 4 Maverick", "612.0", ""],
        ]
    );
}

#[tokio::test]
async fn test_no_table_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("out");
    let (pipeline, _) = pipeline(
        "<html><body><div>Loading...</div></body></html>",
        0,
        &out_dir.join("leaderboard.csv"),
    );

    let err = pipeline.run(&NoProgress).await.unwrap_err();

    assert!(matches!(err, ScrapeError::NoTableFound));
    assert!(!out_dir.exists());
}

#[tokio::test]
async fn test_exhausted_fetch_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("leaderboard.csv");
    let (pipeline, calls) = pipeline(LEADERBOARD, 10, &target);

    let err = pipeline.run(&NoProgress).await.unwrap_err();

    assert!(matches!(err, ScrapeError::Fetch { attempts: 4, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_collect_then_save_elsewhere_after_failure() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file").unwrap();
    let (pipeline, _) = pipeline(LEADERBOARD, 0, &blocker.join("leaderboard.csv"));

    let collected = pipeline.collect(&NoProgress).await.unwrap();
    assert!(pipeline.save(&collected.snapshot).is_err());

    let info = SnapshotWriter::default()
        .write(&collected.snapshot, &dir.path().join("retry.csv"))
        .unwrap();
    assert_eq!(info.rows, 2);
}

#[tokio::test]
#[ignore = "Requires Chrome browser to be installed"]
async fn test_chromium_pipeline_against_inline_page() {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.target.url =
        "data:text/html,<table><thead><tr><th>Provider</th></tr></thead><tbody><tr><td>Local</td></tr></tbody></table>"
            .to_string();
    config.target.interact = false;
    config.browser.settle_delay_ms = 0;
    config.output.path = dir.path().join("inline.csv");

    let summary = Pipeline::from_config(&config)
        .unwrap()
        .run(&NoProgress)
        .await
        .expect("render inline page");

    assert_eq!(summary.rows, 1);
    assert!(summary.output.exists());
}

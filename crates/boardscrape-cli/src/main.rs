//! `boardscrape` - scrape a rendered leaderboard table into a delimited file.

mod cli;
mod logging;
mod progress;

use anyhow::{anyhow, Context, Result};
use boardscrape_browser::{NoProgress, RenderProgress};
use boardscrape_core::{AppConfig, RenderedDocument};
use boardscrape_scraper::{Pipeline, RunSummary, SnapshotWriter, TableExtractor};
use clap::Parser;
use cli::{Cli, Command, ExtractArgs};
use progress::SpinnerProgress;
use std::future::Future;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = cli.quiet;
    let config_path = cli.config.clone();
    let command = match cli.into_command() {
        Ok(command) => command,
        Err(e) => e.exit(),
    };

    let mut config = match AppConfig::load_with_env(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    match &command {
        Command::Run(args) => args.apply(&mut config),
        Command::Extract(args) => args.apply(&mut config),
        Command::Config => return print_config(&config),
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    if let Err(e) = logging::init_tracing(&config.logging) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }
    info!("Starting boardscrape v{}", env!("CARGO_PKG_VERSION"));

    let result = match command {
        Command::Run(_) => run(&config, quiet).await.map(|summary| report(&summary)),
        Command::Extract(args) => extract(&config, &args),
        Command::Config => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_config(config: &AppConfig) -> ExitCode {
    match config.to_toml() {
        Ok(toml) => {
            print!("{toml}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Full run against the live page. Ctrl-C drops the run, closing the browser.
async fn run(config: &AppConfig, quiet: bool) -> Result<RunSummary> {
    let pipeline = Pipeline::from_config(config)?;

    let spinner = (!quiet).then(SpinnerProgress::new);
    let progress: &dyn RenderProgress = match &spinner {
        Some(spinner) => spinner,
        None => &NoProgress,
    };

    let outcome = until_interrupted(
        async { pipeline.run(progress).await.map_err(anyhow::Error::from) },
        tokio::signal::ctrl_c(),
    )
    .await;

    if let Some(spinner) = &spinner {
        spinner.finish();
    }
    outcome
}

/// Drive `work` to completion unless `interrupt` fires first; dropping `work`
/// tears down whatever it owns. An interrupt that fails to install is ignored.
async fn until_interrupted<T>(
    work: impl Future<Output = Result<T>>,
    interrupt: impl Future<Output = std::io::Result<()>>,
) -> Result<T> {
    tokio::select! {
        result = work => result,
        Ok(()) = interrupt => {
            warn!("Interrupted, shutting down");
            Err(anyhow!("interrupted"))
        }
    }
}

/// Extract and write from a saved page.
fn extract(config: &AppConfig, args: &ExtractArgs) -> Result<()> {
    let html = read_page(&args.input)?;
    let extractor = TableExtractor::new(&config.extraction)?;
    let snapshot = extractor.extract(&html, &config.target.url)?;
    let written = SnapshotWriter::from_config(&config.output).write(&snapshot, &config.output.path)?;

    println!(
        "Wrote {} rows x {} columns to {}",
        written.rows,
        snapshot.columns().len(),
        written.path.display()
    );
    Ok(())
}

fn read_page(path: &Path) -> Result<RenderedDocument> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(RenderedDocument::new(html))
}

fn report(summary: &RunSummary) {
    println!(
        "Wrote {} rows x {} columns to {} ({} attempt(s), {:.1}s)",
        summary.rows,
        summary.columns,
        summary.output.display(),
        summary.attempts,
        summary.elapsed.as_secs_f64()
    );
}

//! Command-line arguments.

use boardscrape_core::{AppConfig, OutputFormat};
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "boardscrape",
    about = "Scrape a JavaScript-rendered leaderboard table into a CSV file",
    version,
    after_help = "Running without a subcommand is the same as 'boardscrape run'."
)]
pub struct Cli {
    /// Configuration file (default: ./boardscrape.toml, then the user config dir)
    #[arg(long, short, global = true, env = "BOARDSCRAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Hide the progress spinner
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunArgs,
}

impl Cli {
    /// The subcommand to execute, with `run` as the default.
    ///
    /// Run options given before an explicit subcommand are rejected rather
    /// than silently dropped.
    pub fn into_command(self) -> Result<Command, clap::Error> {
        match self.command {
            None => Ok(Command::Run(self.run)),
            Some(_) if self.run.is_set() => Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                "run options must follow the subcommand, e.g. 'boardscrape run --url <URL>'",
            )),
            Some(command) => Ok(command),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the page, extract the leaderboard and write it out
    Run(RunArgs),
    /// Extract from a saved HTML file without launching a browser
    Extract(ExtractArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Leaderboard page URL
    #[arg(long)]
    pub url: Option<String>,

    /// Output path; a timestamp is inserted before the extension
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Click header controls before capturing the page
    #[arg(long, overrides_with = "no_interact")]
    pub interact: bool,

    /// Capture the page without clicking header controls
    #[arg(long, overrides_with = "interact")]
    pub no_interact: bool,

    /// Output format (csv or tsv)
    #[arg(long)]
    pub format: Option<OutputFormat>,
}

impl RunArgs {
    fn is_set(&self) -> bool {
        self.url.is_some()
            || self.output.is_some()
            || self.interact
            || self.no_interact
            || self.format.is_some()
    }

    fn interact_override(&self) -> Option<bool> {
        if self.interact {
            Some(true)
        } else if self.no_interact {
            Some(false)
        } else {
            None
        }
    }

    /// Layer command-line values over the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.url {
            config.target.url.clone_from(url);
        }
        if let Some(output) = &self.output {
            config.output.path.clone_from(output);
        }
        if let Some(interact) = self.interact_override() {
            config.target.interact = interact;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
    }
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Saved HTML page
    #[arg(long, short)]
    pub input: PathBuf,

    /// Output path; a timestamp is inserted before the extension
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Source URL recorded for the snapshot
    #[arg(long)]
    pub url: Option<String>,

    /// Output format (csv or tsv)
    #[arg(long)]
    pub format: Option<OutputFormat>,
}

impl ExtractArgs {
    /// Layer command-line values over the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.url {
            config.target.url.clone_from(url);
        }
        if let Some(output) = &self.output {
            config.output.path.clone_from(output);
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
    }
}

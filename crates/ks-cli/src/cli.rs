//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use ks_core::config::{ENV_SHEET_ID, ENV_WEB_APP_URL};
use ks_core::UpdateMode;
use std::path::PathBuf;

/// kpisync - Score ad-network exports and sync them to a spreadsheet
#[derive(Parser, Debug)]
#[command(name = "ks")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: kpisync.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Web app endpoint, overrides the config file
    #[arg(long, global = true, env = ENV_WEB_APP_URL, hide_env_values = true)]
    pub web_app_url: Option<String>,

    /// Spreadsheet id or URL, overrides the config file
    #[arg(long, global = true, env = ENV_SHEET_ID)]
    pub sheet_id: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a CSV export and write every view to the spreadsheet
    Sync(SyncArgs),

    /// Score a CSV export and print the results without syncing
    Process(ProcessArgs),

    /// List the spreadsheet's sheets and the resolved destinations
    Sheets(SheetsArgs),

    /// Validate configuration and report missing settings
    Check,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// How secondary views are populated
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Literal computed values
    Direct,
    /// Formulas over the main data sheet
    Formula,
}

impl From<ModeArg> for UpdateMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Direct => UpdateMode::Direct,
            ModeArg::Formula => UpdateMode::Formula,
        }
    }
}

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// CSV export to ingest
    #[arg(long)]
    pub csv: PathBuf,

    /// Override the configured update mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Copy the main data sheet aside before writing
    #[arg(long)]
    pub backup: bool,

    /// Write to an in-memory workbook instead of the web app
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// CSV export to ingest
    #[arg(long)]
    pub csv: PathBuf,

    /// Rows to show in the top performers list (default: config top_n)
    #[arg(short = 'n', long)]
    pub top: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the sheets command
#[derive(Args, Debug)]
pub struct SheetsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

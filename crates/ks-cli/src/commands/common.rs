//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use ks_core::{Config, Dataset, DestinationMap, NormalizeWarning, SpreadsheetId};
use ks_db::{CsvSource, DuckDbCsvReader};
use ks_sheets::{HttpTransport, MemoryWorkbook, QuotaGuard, ResilientClient, RetryPolicy};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::{GlobalArgs, OutputFormat};

/// Spreadsheet id used by `--dry-run` when none is configured.
pub(crate) const DRY_RUN_SPREADSHEET: &str = "dry-run";

/// Error type representing a non-zero process exit code.
///
/// Return `Err(ExitCode(N).into())` instead of calling
/// `std::process::exit(N)` so that destructors run first.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only, never shown to the user.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load the config from `--config` or the current directory, then apply
/// the endpoint flags (which clap has already filled from the environment).
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_from_dir(Path::new(".")).context("Failed to load kpisync.yml")?,
    };
    config.override_endpoint(global.web_app_url.clone(), global.sheet_id.clone());
    config
        .validate()
        .context("Invalid configuration after applying overrides")?;
    Ok(config)
}

/// Client talking to the configured web app.
pub(crate) fn build_client(config: &Config) -> Result<ResilientClient> {
    let url = config.require_web_app_url()?;
    let spreadsheet = config.require_spreadsheet_id()?;
    let transport = HttpTransport::new(url, Duration::from_secs(config.request_timeout_secs))
        .context("Failed to build HTTP client")?;
    let auth = ks_sheets::auth::from_config(&config.auth)
        .context("Failed to load web app credentials")?;

    let mut client = ResilientClient::new(Arc::new(transport), spreadsheet)
        .with_auth(auth)
        .with_policy(RetryPolicy::from_config(&config.retry));
    if let Some(quota) = &config.quota {
        client = client.with_quota(QuotaGuard::in_memory(quota));
    }
    Ok(client)
}

/// Client backed by a fresh in-memory workbook holding one empty `Sheet1`.
pub(crate) fn dry_run_client(config: &Config) -> Result<(Arc<MemoryWorkbook>, ResilientClient)> {
    let spreadsheet = match config.require_spreadsheet_id() {
        Ok(id) => id,
        Err(_) => SpreadsheetId::try_new(DRY_RUN_SPREADSHEET)
            .context("Failed to build dry-run spreadsheet id")?,
    };
    let workbook = Arc::new(MemoryWorkbook::new(spreadsheet.as_str()));
    let client = ResilientClient::new(workbook.clone(), spreadsheet)
        .with_policy(RetryPolicy::from_config(&config.retry));
    Ok((workbook, client))
}

/// Ingest `csv` and score it with the configured column map.
pub(crate) async fn load_dataset(
    csv: &Path,
    config: &Config,
) -> Result<(Dataset, Vec<NormalizeWarning>)> {
    let reader = DuckDbCsvReader::in_memory().context("Failed to open DuckDB")?;
    let table = reader
        .read_table(csv)
        .await
        .with_context(|| format!("Failed to read {}", csv.display()))?;
    log::info!("Read {} row(s) from {}", table.len(), csv.display());

    let (dataset, warnings) = ks_core::score_table(&table, config.column_map());
    for warning in &warnings {
        log::debug!("{}", warning);
    }
    Ok((dataset, warnings))
}

/// Bind every role to a sheet, based on what the spreadsheet holds now.
pub(crate) async fn resolve_destinations(
    client: &ResilientClient,
    config: &Config,
) -> Result<DestinationMap> {
    let existing = client
        .list_sheets()
        .await
        .context("Failed to list sheets")?;
    let destinations = config
        .destinations
        .resolver()
        .resolve(&existing)
        .context("Failed to resolve destination sheets")?;
    Ok(destinations)
}

/// Print `value` as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Print `value` as JSON, or run `text` for the human-readable form.
pub(crate) fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T),
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Text => {
            text(value);
            Ok(())
        }
    }
}

/// Left-aligned table with a dashed rule under the header.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
                .max(h.chars().count())
        })
        .collect();

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", line(headers.to_vec()));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in rows {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;

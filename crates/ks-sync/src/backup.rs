//! Copying the main data sheet aside before a sync overwrites it.

use chrono::{DateTime, Utc};
use ks_core::SheetName;
use ks_sheets::{ResilientClient, SheetsError, SheetsResult};
use serde::Serialize;

/// Outcome of a backup attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupReport {
    pub source: String,
    pub target: String,
    pub success: bool,
    pub rows: usize,
    pub error: Option<String>,
}

/// `backup_YYYYMMDD_HHMMSS` for `at`.
pub fn backup_sheet_name(at: DateTime<Utc>) -> String {
    format!("backup_{}", at.format("%Y%m%d_%H%M%S"))
}

async fn copy_sheet(
    client: &ResilientClient,
    source: &SheetName,
    target: &str,
) -> SheetsResult<usize> {
    let target = SheetName::try_new(target)
        .ok_or_else(|| SheetsError::Validation("backup sheet name is blank".to_string()))?;
    let grid = client.read(source).await?;
    client.create_sheet(&target).await?;
    if grid.is_empty() {
        return Ok(0);
    }
    let rows = grid.len();
    client.overwrite(&target, grid).await?;
    Ok(rows)
}

/// Read `source` and write it to a fresh timestamped sheet. Failures are
/// reported, never propagated.
pub async fn backup_sheet(
    client: &ResilientClient,
    source: &SheetName,
    at: DateTime<Utc>,
) -> BackupReport {
    let target = backup_sheet_name(at);
    log::info!("Backing up '{}' to '{}'", source, target);

    match copy_sheet(client, source, &target).await {
        Ok(rows) => {
            log::info!("Backup complete: {} row(s)", rows);
            BackupReport {
                source: source.to_string(),
                target,
                success: true,
                rows,
                error: None,
            }
        }
        Err(e) => {
            log::warn!("Backup of '{}' failed: {}", source, e);
            BackupReport {
                source: source.to_string(),
                target,
                success: false,
                rows: 0,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
#[path = "backup_test.rs"]
mod tests;

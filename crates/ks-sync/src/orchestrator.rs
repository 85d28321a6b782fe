//! Sync orchestration.
//!
//! Roles are written strictly in order `main_data → summary →
//! top_performers → pivot`. Each role provisions its sheet, builds its
//! payload, and dispatches one write; its outcome is recorded exactly once
//! and never stops the roles after it.

use crate::backup::{backup_sheet, BackupReport};
use crate::formula::FormulaBuilder;
use crate::payload;
use chrono::{DateTime, Utc};
use ks_core::{Dataset, DestinationMap, Grid, NormalizeWarning, Role, SheetName, UpdateMode};
use ks_sheets::quota::{Clock, SystemClock};
use ks_sheets::{ResilientClient, SheetsResult};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Per-run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    pub mode: UpdateMode,
    pub top_n: usize,
    /// Wait before each provisioning call
    pub provision_pause: Duration,
    /// Copy the main data sheet aside before writing
    pub backup: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            mode: UpdateMode::Direct,
            top_n: 10,
            provision_pause: Duration::from_millis(500),
            backup: false,
        }
    }
}

impl SyncOptions {
    pub fn from_config(config: &ks_core::Config) -> Self {
        Self {
            mode: config.update_mode,
            top_n: config.top_n,
            provision_pause: Duration::from_millis(config.provision_pause_ms),
            backup: false,
        }
    }
}

/// The write primitive used for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteKind {
    Overwrite,
    UpdateRange,
    AppendRows,
}

/// Outcome of one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncResult {
    pub role: Role,
    pub sheet: String,
    pub success: bool,
    pub error: Option<String>,
    pub rows_affected: Option<usize>,
    pub write: Option<WriteKind>,
}

impl SyncResult {
    fn failed(role: Role, sheet: &SheetName, error: impl Into<String>) -> Self {
        Self {
            role,
            sheet: sheet.to_string(),
            success: false,
            error: Some(error.into()),
            rows_affected: None,
            write: None,
        }
    }
}

/// Everything a run did.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub run_id: String,
    pub mode: UpdateMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows: usize,
    pub results: Vec<SyncResult>,
    pub backup: Option<BackupReport>,
    /// Cells that could not be parsed while building the dataset
    pub warnings: Vec<NormalizeWarning>,
}

impl SyncReport {
    /// Attach the normalization warnings collected before the run.
    pub fn with_warnings(mut self, warnings: Vec<NormalizeWarning>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncResult> {
        self.results.iter().filter(|r| !r.success)
    }

    pub fn result(&self, role: Role) -> Option<&SyncResult> {
        self.results.iter().find(|r| r.role == role)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

pub struct SyncOrchestrator {
    client: ResilientClient,
    options: SyncOptions,
    clock: Arc<dyn Clock>,
}

impl SyncOrchestrator {
    pub fn new(client: ResilientClient, options: SyncOptions) -> Self {
        Self {
            client,
            options,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn client(&self) -> &ResilientClient {
        &self.client
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Make sure `sheet` exists.
    ///
    /// Success and "already exists" both count. Any other failure gets one
    /// more try after the policy's backoff for that error.
    pub async fn ensure_exists(&self, sheet: &SheetName) -> SheetsResult<()> {
        self.client.sleeper().sleep(self.options.provision_pause).await;
        log::debug!("Provisioning sheet '{}'", sheet);

        match self.client.create_sheet(sheet).await {
            Ok(_) => Ok(()),
            Err(e) => {
                let delay = self.client.policy().delay_for(0, &e);
                log::warn!(
                    "Provisioning '{}' failed: {}; trying once more in {:.1}s",
                    sheet,
                    e,
                    delay.as_secs_f64()
                );
                self.client.sleeper().sleep(delay).await;
                self.client.create_sheet(sheet).await.map(|_| ())
            }
        }
    }

    /// Payload for `role`, or why there is nothing to write.
    fn build_payload(
        &self,
        role: Role,
        dataset: &Dataset,
        destinations: &DestinationMap,
        now: DateTime<Utc>,
    ) -> Result<Grid, String> {
        if role == Role::MainData {
            if dataset.is_empty() {
                return Err("no rows to write".to_string());
            }
            return Ok(payload::main_data_grid(dataset));
        }

        let grid = match self.options.mode {
            UpdateMode::Direct => match role {
                Role::Summary => payload::summary_grid(&dataset.summary(), now),
                Role::TopPerformers => payload::top_performers_grid(dataset, self.options.top_n),
                _ => payload::pivot_grid(dataset),
            },
            UpdateMode::Formula => {
                let formulas = FormulaBuilder::new(&destinations.main_data, dataset.len());
                match role {
                    Role::Summary => formulas.summary_grid(),
                    Role::TopPerformers => formulas.top_performers_grid(self.options.top_n),
                    _ => formulas.pivot_grid(),
                }
            }
        };
        Ok(payload::rectangular(grid))
    }

    /// Primary write for a role on a sheet nothing else has written yet.
    ///
    /// The choice between this and `appendRows` depends on whether the sheet
    /// already took a write in this run, not on the update mode.
    fn primary_write(role: Role) -> WriteKind {
        match role {
            Role::MainData | Role::Pivot => WriteKind::Overwrite,
            Role::Summary | Role::TopPerformers => WriteKind::UpdateRange,
        }
    }

    /// Send one write. For `AppendRows` the blank separator row is not
    /// counted in the returned row count.
    async fn dispatch(
        &self,
        kind: WriteKind,
        sheet: &SheetName,
        grid: Grid,
    ) -> SheetsResult<Option<usize>> {
        let rows = grid.len();
        let (response, separators) = match kind {
            WriteKind::Overwrite => (self.client.overwrite(sheet, grid).await?, 0),
            WriteKind::UpdateRange => (self.client.update_from_a1(sheet, grid).await?, 0),
            WriteKind::AppendRows => {
                // Blank row between views sharing a sheet.
                let width = ks_core::cell::grid_width(&grid);
                let mut block = Vec::with_capacity(rows + 1);
                block.push(vec![serde_json::Value::String(String::new()); width]);
                block.extend(grid);
                (self.client.append_rows(sheet, block).await?, 1)
            }
        };
        let affected = response
            .rows_affected()
            .map_or(rows, |n| n.saturating_sub(separators));
        Ok(Some(affected))
    }

    /// Write every role of `destinations` from `dataset`.
    pub async fn sync(&self, dataset: &Dataset, destinations: &DestinationMap) -> SyncReport {
        let started_at = self.clock.now();
        let run_id = uuid::Uuid::new_v4().to_string();
        log::info!(
            "Sync {} started: {} row(s), {} mode",
            run_id,
            dataset.len(),
            self.options.mode
        );

        let backup = if self.options.backup {
            Some(backup_sheet(&self.client, &destinations.main_data, started_at).await)
        } else {
            None
        };

        // Only successes are remembered; a role whose sheet failed to
        // provision leaves the next role on that sheet to try again.
        let mut provisioned: HashSet<SheetName> = HashSet::new();
        let mut written: HashSet<SheetName> = HashSet::new();
        let mut results = Vec::with_capacity(Role::ORDER.len());

        for (role, sheet) in destinations.iter() {
            log::info!("Syncing {} -> '{}'", role, sheet);

            if !provisioned.contains(sheet) {
                if let Err(e) = self.ensure_exists(sheet).await {
                    log::warn!("{} skipped: could not provision '{}'", role, sheet);
                    results.push(SyncResult::failed(
                        role,
                        sheet,
                        format!("provisioning failed: {e}"),
                    ));
                    continue;
                }
                provisioned.insert(sheet.clone());
            }
            let grid = match self.build_payload(role, dataset, destinations, started_at) {
                Ok(grid) => grid,
                Err(reason) => {
                    log::warn!("{} not written: {}", role, reason);
                    results.push(SyncResult::failed(role, sheet, reason));
                    continue;
                }
            };

            let kind = if written.contains(sheet) {
                WriteKind::AppendRows
            } else {
                Self::primary_write(role)
            };

            match self.dispatch(kind, sheet, grid).await {
                Ok(rows_affected) => {
                    written.insert(sheet.clone());
                    log::info!(
                        "{} written to '{}' ({:?}, {} row(s))",
                        role,
                        sheet,
                        kind,
                        rows_affected.unwrap_or(0)
                    );
                    results.push(SyncResult {
                        role,
                        sheet: sheet.to_string(),
                        success: true,
                        error: None,
                        rows_affected,
                        write: Some(kind),
                    });
                }
                Err(e) => {
                    log::warn!("{} failed on '{}': {}", role, sheet, e);
                    let mut failed = SyncResult::failed(role, sheet, e.to_string());
                    failed.write = Some(kind);
                    results.push(failed);
                }
            }
        }

        let report = SyncReport {
            run_id,
            mode: self.options.mode,
            started_at,
            finished_at: self.clock.now(),
            rows: dataset.len(),
            results,
            backup,
            warnings: Vec::new(),
        };
        log::info!(
            "Sync {} finished: {}/{} role(s) succeeded",
            report.run_id,
            report.results.iter().filter(|r| r.success).count(),
            report.results.len()
        );
        report
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;

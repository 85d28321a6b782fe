//! Sync command implementation

use anyhow::Result;
use ks_sheets::MemoryWorkbook;
use ks_sync::{SyncOptions, SyncOrchestrator, SyncReport};

use crate::cli::{GlobalArgs, SyncArgs};
use crate::commands::common::{self, ExitCode};

/// Execute the sync command
pub(crate) async fn execute(args: &SyncArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let (dataset, warnings) = common::load_dataset(&args.csv, &config).await?;

    let (workbook, client) = if args.dry_run {
        let (workbook, client) = common::dry_run_client(&config)?;
        (Some(workbook), client)
    } else {
        (None, common::build_client(&config)?)
    };
    let destinations = common::resolve_destinations(&client, &config).await?;

    let mut options = SyncOptions::from_config(&config);
    if let Some(mode) = args.mode {
        options.mode = mode.into();
    }
    options.backup = args.backup;

    let report = SyncOrchestrator::new(client, options)
        .sync(&dataset, &destinations)
        .await
        .with_warnings(warnings);

    common::emit(args.output, &report, |report| {
        print_report(report);
        if let Some(workbook) = &workbook {
            print_workbook(workbook);
        }
    })?;

    if report.all_succeeded() {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}

fn print_report(report: &SyncReport) {
    println!(
        "Sync {} ({} mode, {} row(s))",
        report.run_id, report.mode, report.rows
    );
    println!();

    if let Some(backup) = &report.backup {
        if backup.success {
            println!(
                "Backup: '{}' -> '{}' ({} row(s))",
                backup.source, backup.target, backup.rows
            );
        } else {
            println!(
                "Backup of '{}' failed: {}",
                backup.source,
                backup.error.as_deref().unwrap_or("unknown error")
            );
        }
        println!();
    }

    let rows: Vec<Vec<String>> = report
        .results
        .iter()
        .map(|r| {
            vec![
                r.role.to_string(),
                r.sheet.clone(),
                if r.success { "ok" } else { "failed" }.to_string(),
                r.write
                    .map(|w| format!("{:?}", w))
                    .unwrap_or_else(|| "-".to_string()),
                r.rows_affected
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                r.error.clone().unwrap_or_default(),
            ]
        })
        .collect();
    common::print_table(&["ROLE", "SHEET", "STATUS", "WRITE", "ROWS", "ERROR"], &rows);

    if !report.warnings.is_empty() {
        println!();
        println!("{} cell(s) treated as 0:", report.warnings.len());
        for warning in &report.warnings {
            println!("  {}", warning);
        }
    }

    println!();
    let succeeded = report.results.iter().filter(|r| r.success).count();
    println!(
        "{}/{} role(s) succeeded in {}ms",
        succeeded,
        report.results.len(),
        report.duration().num_milliseconds()
    );
}

fn print_workbook(workbook: &MemoryWorkbook) {
    println!();
    println!("Dry run, nothing was sent. In-memory workbook:");
    for name in workbook.sheet_names() {
        let grid = workbook.sheet(&name).unwrap_or_default();
        let width = grid.first().map_or(0, Vec::len);
        println!("  {} ({} x {})", name, grid.len(), width);
    }
}

//! Process command implementation

use anyhow::Result;
use ks_core::{DerivedRow, Grid, NormalizeWarning, SummaryStats};
use ks_sync::payload;
use serde::Serialize;
use serde_json::Value;

use crate::cli::{GlobalArgs, ProcessArgs};
use crate::commands::common;

#[derive(Debug, Serialize)]
struct ProcessOutput<'a> {
    rows: usize,
    warnings: &'a [NormalizeWarning],
    summary: SummaryStats,
    top_performers: Vec<&'a DerivedRow>,
}

/// Execute the process command
pub(crate) async fn execute(args: &ProcessArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let (dataset, warnings) = common::load_dataset(&args.csv, &config).await?;
    let top_n = args.top.unwrap_or(config.top_n);

    let output = ProcessOutput {
        rows: dataset.len(),
        warnings: &warnings,
        summary: dataset.summary(),
        top_performers: dataset.top_performers(top_n),
    };

    common::emit(args.output, &output, |output| {
        print_grid(&payload::summary_grid(&output.summary, chrono::Utc::now()));
        println!();

        println!("Top {} performers", output.top_performers.len());
        println!();
        print_grid(&payload::top_performers_grid(&dataset, top_n));
        println!();

        println!("Mean D1 retained CAC by media type and platform");
        println!();
        print_grid(&payload::pivot_grid(&dataset));

        if !output.warnings.is_empty() {
            println!();
            println!("{} cell(s) treated as 0:", output.warnings.len());
            for warning in output.warnings {
                println!("  {}", warning);
            }
        }
    })
}

/// Print a header-first grid as a table.
fn print_grid(grid: &Grid) {
    let Some((header, rows)) = grid.split_first() else {
        return;
    };
    let header: Vec<String> = header.iter().map(cell_text).collect();
    let header: Vec<&str> = header.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    common::print_table(&header, &rows);
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

//! Sheets command implementation

use anyhow::{Context, Result};
use ks_core::DestinationMap;
use serde::Serialize;

use crate::cli::{GlobalArgs, SheetsArgs};
use crate::commands::common;

#[derive(Debug, Serialize)]
struct SheetsOutput {
    spreadsheet: String,
    sheets: Vec<String>,
    destinations: DestinationMap,
}

/// Execute the sheets command
pub(crate) async fn execute(args: &SheetsArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let client = common::build_client(&config)?;

    let sheets = client
        .list_sheets()
        .await
        .context("Failed to list sheets")?;
    let destinations = config
        .destinations
        .resolver()
        .resolve(&sheets)
        .context("Failed to resolve destination sheets")?;

    let output = SheetsOutput {
        spreadsheet: client.spreadsheet().to_string(),
        sheets,
        destinations,
    };

    common::emit(args.output, &output, |output| {
        println!("Spreadsheet {}: {} sheet(s)", output.spreadsheet, output.sheets.len());
        for name in &output.sheets {
            println!("  {}", name);
        }
        println!();

        let rows: Vec<Vec<String>> = output
            .destinations
            .iter()
            .map(|(role, sheet)| {
                let state = if output.sheets.iter().any(|s| s == sheet.as_str()) {
                    "exists"
                } else {
                    "will be created"
                };
                vec![role.to_string(), sheet.to_string(), state.to_string()]
            })
            .collect();
        common::print_table(&["ROLE", "SHEET", "STATE"], &rows);
    })
}

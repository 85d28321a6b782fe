//! ks-sync - Writing a scored dataset to its destination sheets
//!
//! Builds each role's payload (literal values or formulas over the main
//! data sheet), provisions destination sheets, and reports a per-role
//! outcome for every run.

pub mod backup;
pub mod formula;
pub mod orchestrator;
pub mod payload;

pub use backup::{backup_sheet, backup_sheet_name, BackupReport};
pub use formula::FormulaBuilder;
pub use orchestrator::{SyncOptions, SyncOrchestrator, SyncReport, SyncResult, WriteKind};
pub use payload::MainColumn;

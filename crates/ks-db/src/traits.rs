//! CSV source trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use ks_core::RawTable;
use std::path::Path;

/// A reader that turns an export file into header + text cells.
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait CsvSource: Send + Sync {
    /// Read the whole file. Every cell is returned as text; missing values
    /// are empty strings.
    async fn read_table(&self, path: &Path) -> DbResult<RawTable>;

    /// Source type identifier for logging
    fn source_type(&self) -> &'static str;
}

//! Core library for kpisync
//!
//! This crate provides the data model and scoring pipeline: normalizing raw
//! ad-network export rows, computing KPIs, ranking and grading, and choosing
//! destination sheets, plus the shared configuration and error types.

pub mod a1;
pub mod cell;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod destination;
pub mod error;
pub mod kpi;
pub mod names;
pub(crate) mod newtype_string;
pub mod rank;
pub mod row;

pub use cell::{sanitize_for_transport, CellValue, ColumnFormat, Grid};
pub use classify::{classify, AdAttributes, ContentTheme, CreativeType, MediaType, Platform};
pub use config::{AuthConfig, AuthKind, Config, UpdateMode};
pub use dataset::{Dataset, DistributionEntry, PivotRow, SummaryStats};
pub use destination::{DestinationMap, DestinationResolver, ResolveStrategy, Role};
pub use error::{CoreError, CoreResult};
pub use kpi::{compute_kpis, KpiRow, Kpis};
pub use names::{SheetName, SpreadsheetId};
pub use rank::{rank, DerivedRow, Grade, Ranking};
pub use row::{CanonicalField, ColumnMap, NormalizeWarning, RawRow, RawTable, Row, RowNormalizer};

/// Normalize, score and rank a raw table in one pass.
///
/// Returns the ranked dataset and the soft parse warnings collected along
/// the way.
pub fn score_table(table: &RawTable, column_map: ColumnMap) -> (Dataset, Vec<NormalizeWarning>) {
    let mut normalizer = RowNormalizer::new(column_map);
    let rows = normalizer.normalize_table(table);
    let dataset = rank(rows.into_iter().map(compute_kpis).collect());
    (dataset, normalizer.into_warnings())
}

//! ks-db - CSV ingestion for kpisync
//!
//! This crate provides the `CsvSource` trait and a DuckDB-backed reader that
//! loads an export file as plain text cells for the normalizer.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::{DuckDbCsvReader, DEFAULT_ENCODINGS};
pub use error::{DbError, DbResult};
pub use traits::CsvSource;

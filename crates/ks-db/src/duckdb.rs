//! DuckDB-backed CSV reader

use crate::error::{DbError, DbResult};
use crate::traits::CsvSource;
use async_trait::async_trait;
use duckdb::Connection;
use ks_core::RawTable;
use std::path::Path;
use std::sync::Mutex;

/// Encodings tried in order until one decodes the file.
pub const DEFAULT_ENCODINGS: [&str; 3] = ["utf-8", "utf-16", "latin-1"];

/// Reads CSV exports through an in-memory DuckDB connection.
pub struct DuckDbCsvReader {
    conn: Mutex<Connection>,
    encodings: Vec<String>,
}

impl DuckDbCsvReader {
    /// Create a reader over a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            encodings: DEFAULT_ENCODINGS.iter().map(|e| e.to_string()).collect(),
        })
    }

    /// Replace the encoding fallback list.
    pub fn with_encodings<I, S>(mut self, encodings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.encodings = encodings.into_iter().map(Into::into).collect();
        self
    }

    pub fn encodings(&self) -> &[String] {
        &self.encodings
    }

    fn read_table_sync(&self, path: &Path) -> DbResult<RawTable> {
        if !path.is_file() {
            return Err(DbError::FileNotFound(path.display().to_string()));
        }

        let mut last_error = String::from("no encodings configured");
        for encoding in &self.encodings {
            match self.read_with_encoding(path, encoding) {
                Ok(table) => {
                    log::info!(
                        "Loaded {} row(s) x {} column(s) from {} ({})",
                        table.len(),
                        table.headers.len(),
                        path.display(),
                        encoding
                    );
                    return Ok(table);
                }
                Err(e) => {
                    log::debug!("Reading {} as {} failed: {}", path.display(), encoding, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(DbError::CsvError {
            path: path.display().to_string(),
            tried: self.encodings.join(", "),
            message: last_error,
        })
    }

    fn read_with_encoding(&self, path: &Path, encoding: &str) -> DbResult<RawTable> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;

        let sql = format!(
            "SELECT * FROM read_csv('{}', header = true, all_varchar = true, encoding = '{}')",
            escape_literal(&path.display().to_string()),
            escape_literal(encoding)
        );
        let mut stmt = conn.prepare(&sql)?;

        // Column metadata is only available once the statement has run.
        let rows: Vec<Vec<String>> = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                Ok((0..col_count).map(|i| cell_as_string(row, i)).collect())
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let headers: Vec<String> = (0..stmt.column_count())
            .map(|i| stmt.column_name(i).map_or(String::new(), |v| v.to_string()))
            .collect();

        Ok(RawTable { headers, rows })
    }
}

/// NULL cells read back as empty strings.
fn cell_as_string(row: &duckdb::Row<'_>, idx: usize) -> String {
    match row.get::<_, Option<String>>(idx) {
        Ok(Some(s)) => s,
        _ => String::new(),
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

#[async_trait]
impl CsvSource for DuckDbCsvReader {
    async fn read_table(&self, path: &Path) -> DbResult<RawTable> {
        self.read_table_sync(path)
    }

    fn source_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;

//! Preparing values for the remote service.
//!
//! The destination only understands JSON strings, numbers and booleans.
//! Every cell that leaves the process goes through [`sanitize_for_transport`]
//! so the coercions (NaN, infinities, categorical labels) live in one place.

use serde_json::Value;

/// A 2-D block of cells as sent to or read from the destination.
pub type Grid = Vec<Vec<Value>>;

/// Literal written in place of an infinite value.
pub const NOT_AVAILABLE: &str = "N/A";

/// A cell before transport preparation.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    /// A categorical label (media type, grade, ...)
    Category(&'static str),
    Number(f64),
    /// Pre-built JSON, e.g. a formula string
    Raw(Value),
}

/// Presentation applied to a numeric column at the serialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    /// Plain JSON number
    Plain,
    /// 2 decimal places, as a string
    Money,
    /// 1 decimal place with a `%` suffix, as a string
    Percent,
    /// Rounded integer
    Count,
    /// 2 decimal places, as a string
    Score,
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// Convert a cell to its wire form.
///
/// NaN becomes an empty string, positive or negative infinity becomes
/// `"N/A"`, categorical labels become plain strings.
pub fn sanitize_for_transport(cell: &CellValue) -> Value {
    match cell {
        CellValue::Text(s) => Value::String(s.clone()),
        CellValue::Category(label) => Value::String((*label).to_string()),
        CellValue::Number(n) => sanitize_number(*n, ColumnFormat::Plain),
        CellValue::Raw(v) => v.clone(),
    }
}

/// Convert a number to its wire form using `format`.
pub fn sanitize_number(value: f64, format: ColumnFormat) -> Value {
    if value.is_nan() {
        return Value::String(String::new());
    }
    if value.is_infinite() {
        return Value::String(NOT_AVAILABLE.to_string());
    }
    match format {
        ColumnFormat::Plain => serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(String::new())),
        ColumnFormat::Money | ColumnFormat::Score => Value::String(format!("{value:.2}")),
        ColumnFormat::Percent => Value::String(format!("{value:.1}%")),
        ColumnFormat::Count => Value::from(value.round() as i64),
    }
}

/// Sanitize a whole row of cells.
pub fn sanitize_row(cells: &[CellValue]) -> Vec<Value> {
    cells.iter().map(sanitize_for_transport).collect()
}

/// Width of the widest row in `grid`.
pub fn grid_width(grid: &[Vec<Value>]) -> usize {
    grid.iter().map(Vec::len).max().unwrap_or(0)
}

#[cfg(test)]
#[path = "cell_test.rs"]
mod tests;

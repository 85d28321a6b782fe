//! Canonical row schema and the normalizer that maps raw export rows onto it.
//!
//! Ad-network exports name the same measure differently depending on the
//! report template (`Cost (sum)` vs `Cost`, `Retention Day 01 (sum)` vs
//! `D1 Retained Users`). A [`ColumnMap`] folds those headers onto the
//! [`CanonicalField`]s and [`RowNormalizer`] coerces the cell text. Bad cells
//! never abort a batch: they become 0 and a [`NormalizeWarning`] is kept for
//! the run report.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// The canonical input schema every row is normalized onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    AdName,
    Cost,
    Impressions,
    Clicks,
    Installs,
    Signups,
    D1RetainedUsers,
}

impl CanonicalField {
    /// All canonical fields in projection order.
    pub const ALL: [CanonicalField; 7] = [
        CanonicalField::AdName,
        CanonicalField::Cost,
        CanonicalField::Impressions,
        CanonicalField::Clicks,
        CanonicalField::Installs,
        CanonicalField::Signups,
        CanonicalField::D1RetainedUsers,
    ];

    /// The snake_case name used as the header on the destination sheet.
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::AdName => "ad_name",
            CanonicalField::Cost => "cost",
            CanonicalField::Impressions => "impressions",
            CanonicalField::Clicks => "clicks",
            CanonicalField::Installs => "installs",
            CanonicalField::Signups => "signups",
            CanonicalField::D1RetainedUsers => "d1_retained_users",
        }
    }

    /// Whether the field holds a number (everything except `ad_name`).
    pub fn is_numeric(self) -> bool {
        !matches!(self, CanonicalField::AdName)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized input row. Every canonical field is always present.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Row {
    pub ad_name: String,
    pub cost: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub installs: f64,
    pub signups: f64,
    pub d1_retained_users: f64,
}

impl Row {
    /// Create a row with the given ad name and all measures at zero.
    pub fn new(ad_name: impl Into<String>) -> Self {
        Self {
            ad_name: ad_name.into(),
            ..Self::default()
        }
    }

    /// Read a numeric field. `ad_name` has no numeric value.
    pub fn numeric(&self, field: CanonicalField) -> Option<f64> {
        match field {
            CanonicalField::AdName => None,
            CanonicalField::Cost => Some(self.cost),
            CanonicalField::Impressions => Some(self.impressions),
            CanonicalField::Clicks => Some(self.clicks),
            CanonicalField::Installs => Some(self.installs),
            CanonicalField::Signups => Some(self.signups),
            CanonicalField::D1RetainedUsers => Some(self.d1_retained_users),
        }
    }

    fn set_numeric(&mut self, field: CanonicalField, value: f64) {
        match field {
            CanonicalField::AdName => {}
            CanonicalField::Cost => self.cost = value,
            CanonicalField::Impressions => self.impressions = value,
            CanonicalField::Clicks => self.clicks = value,
            CanonicalField::Installs => self.installs = value,
            CanonicalField::Signups => self.signups = value,
            CanonicalField::D1RetainedUsers => self.d1_retained_users = value,
        }
    }
}

/// One raw record: source header text paired with the cell text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    /// Build a raw row from `(header, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Iterate `(header, value)` pairs in source column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A whole export as read from disk: one header line plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the export has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pair each data row with the headers.
    ///
    /// A UTF-8 byte-order mark left on the first header is stripped. Short
    /// rows are padded with empty cells.
    pub fn raw_rows(&self) -> impl Iterator<Item = RawRow> + '_ {
        let headers: Vec<String> = self
            .headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        self.rows.iter().map(move |values| {
            RawRow::from_pairs(headers.iter().enumerate().map(|(i, h)| {
                (h.clone(), values.get(i).cloned().unwrap_or_default())
            }))
        })
    }
}

/// Mapping from source header text to canonical field.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    entries: HashMap<String, CanonicalField>,
}

const BUILTIN_HEADERS: &[(&str, CanonicalField)] = &[
    ("Ad", CanonicalField::AdName),
    ("Ad Name", CanonicalField::AdName),
    ("Cost (sum)", CanonicalField::Cost),
    ("Cost", CanonicalField::Cost),
    ("Impressions (sum)", CanonicalField::Impressions),
    ("Impressions", CanonicalField::Impressions),
    ("Clicks (sum)", CanonicalField::Clicks),
    ("Clicks", CanonicalField::Clicks),
    ("Installs (sum)", CanonicalField::Installs),
    ("Installs", CanonicalField::Installs),
    ("Unique Users - etc_sign_up (sum)", CanonicalField::Signups),
    ("Retention Day 01 (sum)", CanonicalField::D1RetainedUsers),
    ("D1 Retained Users", CanonicalField::D1RetainedUsers),
    ("Retained Day 1", CanonicalField::D1RetainedUsers),
];

impl Default for ColumnMap {
    fn default() -> Self {
        let mut map = Self::empty();
        for field in CanonicalField::ALL {
            map.insert(field.as_str(), field);
        }
        for (header, field) in BUILTIN_HEADERS {
            map.insert(*header, *field);
        }
        map
    }
}

impl ColumnMap {
    /// A map that recognizes nothing.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace the mapping for one source header.
    pub fn insert(&mut self, header: impl Into<String>, field: CanonicalField) {
        self.entries.insert(header.into(), field);
    }

    /// Default map extended with user-configured headers.
    pub fn with_overrides(overrides: &HashMap<String, CanonicalField>) -> Self {
        let mut map = Self::default();
        for (header, field) in overrides {
            map.insert(header.clone(), *field);
        }
        map
    }

    /// Look up a source header, tolerating surrounding whitespace.
    pub fn resolve(&self, header: &str) -> Option<CanonicalField> {
        self.entries
            .get(header)
            .or_else(|| self.entries.get(header.trim()))
            .copied()
    }
}

/// A numeric cell that could not be parsed and was treated as 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizeWarning {
    /// Zero-based data row index.
    pub row: usize,
    /// Canonical field the cell was mapped to.
    pub field: CanonicalField,
    /// Original cell text.
    pub value: String,
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: could not parse {} value '{}', using 0",
            self.row + 1,
            self.field,
            self.value
        )
    }
}

/// Parse a numeric cell. Currency symbols and thousands separators are
/// stripped; an empty cell is 0. Returns `None` for unparsable or
/// non-finite text.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Some(0.0);
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Maps raw rows onto [`Row`] and collects run-level warnings.
#[derive(Debug)]
pub struct RowNormalizer {
    column_map: ColumnMap,
    rows_seen: usize,
    warnings: Vec<NormalizeWarning>,
}

impl RowNormalizer {
    pub fn new(column_map: ColumnMap) -> Self {
        Self {
            column_map,
            rows_seen: 0,
            warnings: Vec::new(),
        }
    }

    /// Normalize one raw row.
    ///
    /// Unmapped source columns are dropped and canonical fields the source
    /// lacks stay at their defaults. When two source headers map to the same
    /// field, the leftmost one wins.
    pub fn normalize(&mut self, raw: &RawRow) -> Row {
        let row_index = self.rows_seen;
        self.rows_seen += 1;

        let mut row = Row::default();
        let mut seen = HashSet::new();

        for (header, value) in raw.iter() {
            let Some(field) = self.column_map.resolve(header) else {
                continue;
            };
            if !seen.insert(field) {
                continue;
            }
            if field == CanonicalField::AdName {
                row.ad_name = value.trim().to_string();
                continue;
            }
            match parse_numeric(value) {
                Some(number) => row.set_numeric(field, number),
                None => self.warnings.push(NormalizeWarning {
                    row: row_index,
                    field,
                    value: value.to_string(),
                }),
            }
        }

        row
    }

    /// Normalize every row of an export, in order.
    pub fn normalize_table(&mut self, table: &RawTable) -> Vec<Row> {
        let before = self.warnings.len();
        let rows: Vec<Row> = table.raw_rows().map(|raw| self.normalize(&raw)).collect();
        let added = self.warnings.len() - before;
        if added > 0 {
            log::warn!(
                "{} numeric cell(s) could not be parsed and were treated as 0",
                added
            );
        }
        rows
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[NormalizeWarning] {
        &self.warnings
    }

    /// Consume the normalizer, keeping only its warnings.
    pub fn into_warnings(self) -> Vec<NormalizeWarning> {
        self.warnings
    }
}

#[cfg(test)]
#[path = "row_test.rs"]
mod tests;

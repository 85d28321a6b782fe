//! Strongly-typed identifiers for the remote spreadsheet and its sheets.

use crate::newtype_string::define_wire_name;

define_wire_name! {
    /// Name of a sheet (tab) inside the destination spreadsheet.
    pub struct SheetName;
}

define_wire_name! {
    /// Identifier of the destination spreadsheet.
    pub struct SpreadsheetId;
}

impl SpreadsheetId {
    /// Accept either a bare id or a full spreadsheet URL.
    ///
    /// For URLs of the form `https://docs.google.com/spreadsheets/d/<id>/edit`
    /// the segment after `/d/` is taken; anything else is used verbatim.
    pub fn from_url_or_id(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        match trimmed.split_once("/d/") {
            Some((_, rest)) => Self::try_new(rest.split('/').next().unwrap_or_default()),
            None => Self::try_new(trimmed),
        }
    }
}

#[cfg(test)]
#[path = "names_test.rs"]
mod tests;

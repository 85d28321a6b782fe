//! The closed set of operations the web app accepts.
//!
//! Each variant carries exactly the fields its action needs, and
//! [`Operation::validate`] checks them before anything is sent.

use crate::error::{SheetsError, SheetsResult};
use ks_core::a1;
use ks_core::{Grid, SheetName, SpreadsheetId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire name of a POST action, or the GET read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Update,
    Append,
    Clear,
    Overwrite,
    CreateSheet,
    GetSheetNames,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Update => "update",
            Action::Append => "append",
            Action::Clear => "clear",
            Action::Overwrite => "overwrite",
            Action::CreateSheet => "create_sheet",
            Action::GetSheetNames => "get_sheet_names",
        }
    }

    /// Parse a POST action name. `read` is not a POST action.
    pub fn from_post(name: &str) -> Option<Self> {
        match name {
            "update" => Some(Action::Update),
            "append" => Some(Action::Append),
            "clear" => Some(Action::Clear),
            "overwrite" => Some(Action::Overwrite),
            "create_sheet" => Some(Action::CreateSheet),
            "get_sheet_names" => Some(Action::GetSheetNames),
            _ => None,
        }
    }

    /// Whether the action modifies the spreadsheet.
    pub fn is_write(self) -> bool {
        !matches!(self, Action::Read | Action::GetSheetNames)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to the web app.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Read the used range of a sheet
    Read { sheet: SheetName },
    /// Write `values` into `range`
    UpdateRange {
        sheet: SheetName,
        range: String,
        values: Grid,
    },
    /// Append rows after the last used row
    AppendRows { sheet: SheetName, rows: Grid },
    /// Clear the sheet, then write `values` from `A1`
    Overwrite { sheet: SheetName, values: Grid },
    /// Clear `range`, or the whole sheet
    Clear {
        sheet: SheetName,
        range: Option<String>,
    },
    ListSheets,
    CreateSheet { sheet: SheetName },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// JSON body of a POST request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostBody {
    pub sheet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Grid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

/// A request ready for a [`Transport`](crate::transport::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    pub method: Method,
    /// Query string parameters; authentication is added here too
    pub params: Vec<(String, String)>,
    pub body: Option<PostBody>,
}

impl WireRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn push_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.push((name.into(), value.into()));
    }

    /// The action this request performs.
    pub fn action(&self) -> Option<Action> {
        match (&self.method, &self.body) {
            (Method::Get, _) => Some(Action::Read),
            (Method::Post, Some(body)) => Action::from_post(&body.action),
            (Method::Post, None) => None,
        }
    }
}

impl Operation {
    pub fn action(&self) -> Action {
        match self {
            Operation::Read { .. } => Action::Read,
            Operation::UpdateRange { .. } => Action::Update,
            Operation::AppendRows { .. } => Action::Append,
            Operation::Overwrite { .. } => Action::Overwrite,
            Operation::Clear { .. } => Action::Clear,
            Operation::ListSheets => Action::GetSheetNames,
            Operation::CreateSheet { .. } => Action::CreateSheet,
        }
    }

    pub fn sheet(&self) -> Option<&SheetName> {
        match self {
            Operation::Read { sheet }
            | Operation::UpdateRange { sheet, .. }
            | Operation::AppendRows { sheet, .. }
            | Operation::Overwrite { sheet, .. }
            | Operation::Clear { sheet, .. }
            | Operation::CreateSheet { sheet } => Some(sheet),
            Operation::ListSheets => None,
        }
    }

    /// Check the per-action field contract.
    pub fn validate(&self) -> SheetsResult<()> {
        match self {
            Operation::UpdateRange { range, values, .. } => {
                if !a1::is_valid_range(range) {
                    return Err(SheetsError::Validation(format!(
                        "update requires a valid A1 range, got '{}'",
                        range
                    )));
                }
                if values.is_empty() {
                    return Err(SheetsError::Validation("update requires data".to_string()));
                }
                Ok(())
            }
            Operation::AppendRows { rows, .. } => {
                if rows.is_empty() {
                    return Err(SheetsError::Validation(
                        "append requires at least one row".to_string(),
                    ));
                }
                Ok(())
            }
            Operation::Overwrite { values, .. } => {
                if values.is_empty() {
                    return Err(SheetsError::Validation("overwrite requires data".to_string()));
                }
                Ok(())
            }
            Operation::Clear {
                range: Some(range), ..
            } if !a1::is_valid_range(range) => Err(SheetsError::Validation(format!(
                "clear range '{}' is not valid A1 notation",
                range
            ))),
            _ => Ok(()),
        }
    }

    /// Build the wire request for `spreadsheet`.
    pub fn to_request(&self, spreadsheet: &SpreadsheetId) -> WireRequest {
        if let Operation::Read { sheet } = self {
            return WireRequest {
                method: Method::Get,
                params: vec![
                    ("sheetId".to_string(), spreadsheet.to_string()),
                    ("sheetName".to_string(), sheet.to_string()),
                ],
                body: None,
            };
        }

        let (data, range) = match self {
            Operation::UpdateRange { range, values, .. } => {
                (Some(values.clone()), Some(range.clone()))
            }
            Operation::AppendRows { rows, .. } => (Some(rows.clone()), None),
            Operation::Overwrite { values, .. } => (Some(values.clone()), None),
            Operation::Clear { range, .. } => (None, range.clone()),
            _ => (None, None),
        };

        WireRequest {
            method: Method::Post,
            params: Vec::new(),
            body: Some(PostBody {
                sheet_id: spreadsheet.to_string(),
                sheet_name: self.sheet().map(|s| s.to_string()),
                action: self.action().as_str().to_string(),
                data,
                range,
            }),
        }
    }
}

#[cfg(test)]
#[path = "operation_test.rs"]
mod tests;

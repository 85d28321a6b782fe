//! The web app's response envelope.

use crate::error::{SheetsError, SheetsResult};
use ks_core::Grid;
use serde::{Deserialize, Serialize};

/// `{statusCode, timestamp, ...payload}` as returned by every call.
///
/// Fields absent from a given action's payload stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Grid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,
    #[serde(default, alias = "sheets", skip_serializing_if = "Option::is_none")]
    pub sheet_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl ApiResponse {
    /// A successful envelope stamped with `status_code` 200.
    pub fn ok(timestamp: impl Into<String>) -> Self {
        Self {
            status_code: Some(200),
            timestamp: Some(timestamp.into()),
            success: Some(true),
            ..Self::default()
        }
    }

    /// A failed envelope.
    pub fn failure(status: u16, timestamp: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status_code: Some(status),
            timestamp: Some(timestamp.into()),
            success: Some(false),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_data(mut self, data: Grid) -> Self {
        self.rows = Some(data.len());
        self.columns = Some(ks_core::cell::grid_width(&data));
        self.data = Some(data);
        self
    }

    /// Record the number of rows a write touched.
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn with_sheet_names(mut self, names: Vec<String>) -> Self {
        self.count = Some(names.len());
        self.sheet_names = Some(names);
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
            && self.success != Some(false)
            && self.status_code.map_or(true, |s| s < 400)
    }

    /// Turn an error envelope into a [`SheetsError`]. `http_status` is used
    /// when the body carries no `statusCode` of its own.
    pub fn into_result(self, http_status: Option<u16>) -> SheetsResult<ApiResponse> {
        if self.is_success() {
            return Ok(self);
        }
        let status = self.status_code.or(http_status);
        let message = self
            .error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| format!("request failed with status {}", status.unwrap_or(0)));
        Err(SheetsError::from_remote(status, &message))
    }

    /// Rows touched by the call, from `rows` or the data length.
    pub fn rows_affected(&self) -> Option<usize> {
        self.rows.or_else(|| self.data.as_ref().map(Vec::len))
    }
}

#[cfg(test)]
#[path = "response_test.rs"]
mod tests;

//! An in-process spreadsheet that speaks the web app's contract.
//!
//! Used as the `--dry-run` destination and as the test double for everything
//! above the transport. It enforces the same required-parameter rules and
//! status codes as the deployed script, can require tokens or an API key,
//! can apply a request quota, records an access log, and can be told to fail.

use crate::auth::{API_KEY_PARAM, TOKEN_PARAM};
use crate::error::{SheetsError, SheetsResult};
use crate::operation::{Action, Method, PostBody, WireRequest};
use crate::quota::{Clock, QuotaGuard, SystemClock};
use crate::response::ApiResponse;
use crate::transport::Transport;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ks_core::a1;
use ks_core::cell::grid_width;
use ks_core::Grid;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Client id recorded when a request carries no credential.
pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// One read or write seen by the workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessLogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub client: String,
    pub sheet_id: String,
    pub sheet_name: Option<String>,
    /// Identity the workbook acted as
    pub actor: String,
}

#[derive(Default)]
struct WorkbookState {
    sheets: Vec<(String, Grid)>,
    access_log: Vec<AccessLogEntry>,
    pending_faults: VecDeque<SheetsError>,
    sheet_faults: HashMap<String, SheetsError>,
    requests: usize,
}

impl WorkbookState {
    fn sheet_mut(&mut self, name: &str) -> Option<&mut Grid> {
        self.sheets
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, grid)| grid)
    }
}

pub struct MemoryWorkbook {
    spreadsheet_id: String,
    state: Mutex<WorkbookState>,
    tokens: Option<HashSet<String>>,
    api_key: Option<String>,
    quota: Option<QuotaGuard>,
    clock: Arc<dyn Clock>,
    actor: String,
}

impl MemoryWorkbook {
    /// A workbook with a single empty `Sheet1`.
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self::with_sheets(spreadsheet_id, ["Sheet1"])
    }

    pub fn with_sheets<I, S>(spreadsheet_id: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = WorkbookState {
            sheets: names.into_iter().map(|n| (n.into(), Grid::new())).collect(),
            ..WorkbookState::default()
        };
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            state: Mutex::new(state),
            tokens: None,
            api_key: None,
            quota: None,
            clock: Arc::new(SystemClock),
            actor: "memory@localhost".to_string(),
        }
    }

    /// Accept only requests carrying one of `tokens`.
    pub fn require_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    /// Accept only requests carrying `key`.
    pub fn require_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_quota(mut self, quota: QuotaGuard) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Fail the next request with `error`, before any processing.
    /// Calls queue up.
    pub fn fail_next(&self, error: SheetsError) {
        if let Ok(mut state) = self.state.lock() {
            state.pending_faults.push_back(error);
        }
    }

    /// Fail every request that targets `sheet`.
    pub fn fail_sheet(&self, sheet: impl Into<String>, error: SheetsError) {
        if let Ok(mut state) = self.state.lock() {
            state.sheet_faults.insert(sheet.into(), error);
        }
    }

    pub fn clear_faults(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.pending_faults.clear();
            state.sheet_faults.clear();
        }
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.sheets.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default()
    }

    /// Rectangular contents of `name`, if the sheet exists.
    pub fn sheet(&self, name: &str) -> Option<Grid> {
        let state = self.state.lock().ok()?;
        state
            .sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, grid)| rectangular(grid))
    }

    pub fn access_log(&self) -> Vec<AccessLogEntry> {
        self.state
            .lock()
            .map(|s| s.access_log.clone())
            .unwrap_or_default()
    }

    /// Requests received, including failed ones.
    pub fn request_count(&self) -> usize {
        self.state.lock().map(|s| s.requests).unwrap_or(0)
    }

    fn timestamp(&self) -> String {
        self.clock.now().to_rfc3339()
    }

    fn fail(&self, status: u16, error: impl Into<String>) -> ApiResponse {
        ApiResponse::failure(status, self.timestamp(), error)
    }

    fn client_id(&self, request: &WireRequest) -> String {
        request
            .param(TOKEN_PARAM)
            .or_else(|| request.param(API_KEY_PARAM))
            .unwrap_or(ANONYMOUS_CLIENT)
            .to_string()
    }

    fn authorize(&self, request: &WireRequest) -> Option<ApiResponse> {
        if let Some(tokens) = &self.tokens {
            match request.param(TOKEN_PARAM) {
                Some(token) if tokens.contains(token) => {}
                _ => return Some(self.fail(401, "Unauthorized: invalid or missing token")),
            }
        }
        if let Some(key) = &self.api_key {
            if request.param(API_KEY_PARAM) != Some(key.as_str()) {
                return Some(self.fail(401, "Unauthorized: invalid or missing API key"));
            }
        }
        None
    }

    /// Process one request as the web app would. Never panics; every
    /// failure is an error envelope.
    pub fn handle(&self, request: &WireRequest) -> SheetsResult<ApiResponse> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SheetsError::Internal("workbook state poisoned".to_string()))?;
        state.requests += 1;

        if let Some(fault) = state.pending_faults.pop_front() {
            return Err(fault);
        }
        if let Some(denied) = self.authorize(request) {
            return Ok(denied);
        }
        let client = self.client_id(request);
        if let Some(quota) = &self.quota {
            if let Err(e) = quota.check(&client) {
                return Ok(self.fail(429, e.message().to_string()));
            }
        }

        let (sheet_id, sheet_name, action) = match request.method {
            Method::Get => (
                request.param("sheetId").map(str::to_string),
                request.param("sheetName").map(str::to_string),
                Some(Action::Read),
            ),
            Method::Post => match &request.body {
                Some(body) => (
                    Some(body.sheet_id.clone()),
                    body.sheet_name.clone(),
                    Action::from_post(&body.action),
                ),
                None => return Ok(self.fail(400, "Missing request body")),
            },
        };

        let sheet_id = match sheet_id.filter(|s| !s.trim().is_empty()) {
            Some(id) => id,
            None => return Ok(self.fail(400, "Missing required parameter: sheetId")),
        };
        if sheet_id != self.spreadsheet_id {
            return Ok(self.fail(404, format!("Spreadsheet not found: {}", sheet_id)));
        }
        let Some(action) = action else {
            let name = request.body.as_ref().map_or("", |b| b.action.as_str());
            return Ok(self.fail(400, format!("Invalid action: {}", name)));
        };

        if let Some(name) = &sheet_name {
            if let Some(fault) = state.sheet_faults.get(name) {
                return Err(fault.clone());
            }
        }

        state.access_log.push(AccessLogEntry {
            timestamp: self.clock.now(),
            action: action.as_str().to_string(),
            client,
            sheet_id,
            sheet_name: sheet_name.clone(),
            actor: self.actor.clone(),
        });

        let empty = PostBody {
            sheet_id: String::new(),
            sheet_name: None,
            action: String::new(),
            data: None,
            range: None,
        };
        let body = request.body.as_ref().unwrap_or(&empty);
        Ok(self.dispatch(&mut state, action, sheet_name, body))
    }

    fn dispatch(
        &self,
        state: &mut WorkbookState,
        action: Action,
        sheet_name: Option<String>,
        body: &PostBody,
    ) -> ApiResponse {
        match action {
            Action::GetSheetNames => {
                let names = state.sheets.iter().map(|(n, _)| n.clone()).collect();
                return ApiResponse::ok(self.timestamp()).with_sheet_names(names);
            }
            Action::CreateSheet => {
                let Some(name) = sheet_name.filter(|n| !n.trim().is_empty()) else {
                    return self.fail(400, "create_sheet requires sheetName");
                };
                if state.sheet_mut(&name).is_some() {
                    return ApiResponse::ok(self.timestamp())
                        .with_message(format!("Sheet already exists: {}", name));
                }
                state.sheets.push((name.clone(), Grid::new()));
                return ApiResponse::ok(self.timestamp())
                    .with_message(format!("Sheet created: {}", name));
            }
            _ => {}
        }

        // Remaining actions address a sheet, defaulting to the first one.
        let name = match sheet_name.or_else(|| state.sheets.first().map(|(n, _)| n.clone())) {
            Some(name) => name,
            None => return self.fail(404, "Spreadsheet has no sheets"),
        };
        let timestamp = self.timestamp();
        let Some(grid) = state.sheet_mut(&name) else {
            return self.fail(404, format!("Sheet not found: {}", name));
        };

        match action {
            Action::Read => ApiResponse::ok(timestamp).with_data(rectangular(grid)),
            Action::Update => {
                let Some(range) = &body.range else {
                    return self.fail(400, "update requires range");
                };
                let Some(data) = &body.data else {
                    return self.fail(400, "update requires data");
                };
                let Some(((col0, row0), (col1, row1))) = a1::parse_range(range) else {
                    return self.fail(400, format!("Invalid range: {}", range));
                };
                if data.len() > row1 - row0 + 1 || grid_width(data) > col1 - col0 + 1 {
                    return self.fail(400, format!("Data dimensions do not match range {}", range));
                }
                write_at(grid, row0, col0, data);
                ApiResponse::ok(timestamp)
                    .with_message(format!("Updated {} row(s) in {}", data.len(), name))
                    .with_rows(data.len())
            }
            Action::Append => match &body.data {
                Some(rows) if !rows.is_empty() => {
                    grid.extend(rows.iter().cloned());
                    ApiResponse::ok(timestamp)
                        .with_message(format!("Appended {} row(s) to {}", rows.len(), name))
                        .with_rows(rows.len())
                }
                _ => self.fail(400, "append requires data"),
            },
            Action::Overwrite => match &body.data {
                Some(values) => {
                    *grid = values.clone();
                    ApiResponse::ok(timestamp)
                        .with_message(format!("Overwrote {} with {} row(s)", name, values.len()))
                        .with_rows(values.len())
                }
                None => self.fail(400, "overwrite requires data"),
            },
            Action::Clear => match &body.range {
                Some(range) => match a1::parse_range(range) {
                    Some(((col0, row0), (col1, row1))) => {
                        for row in grid.iter_mut().take(row1 + 1).skip(row0) {
                            for cell in row.iter_mut().take(col1 + 1).skip(col0) {
                                *cell = Value::String(String::new());
                            }
                        }
                        ApiResponse::ok(timestamp).with_message(format!("Cleared {}!{}", name, range))
                    }
                    None => self.fail(400, format!("Invalid range: {}", range)),
                },
                None => {
                    grid.clear();
                    ApiResponse::ok(timestamp).with_message(format!("Cleared {}", name))
                }
            },
            Action::GetSheetNames | Action::CreateSheet => {
                self.fail(500, format!("unhandled action {}", action))
            }
        }
    }
}

/// Pad every row to the widest row.
fn rectangular(grid: &Grid) -> Grid {
    let width = grid_width(grid);
    grid.iter()
        .map(|row| {
            let mut row = row.clone();
            row.resize(width, Value::String(String::new()));
            row
        })
        .collect()
}

fn write_at(grid: &mut Grid, row0: usize, col0: usize, data: &Grid) {
    for (r, values) in data.iter().enumerate() {
        let target = row0 + r;
        if grid.len() <= target {
            grid.resize(target + 1, Vec::new());
        }
        let row = &mut grid[target];
        if row.len() < col0 + values.len() {
            row.resize(col0 + values.len(), Value::String(String::new()));
        }
        for (c, value) in values.iter().enumerate() {
            row[col0 + c] = value.clone();
        }
    }
}

#[async_trait]
impl Transport for MemoryWorkbook {
    async fn send(&self, request: &WireRequest) -> SheetsResult<ApiResponse> {
        self.handle(request)?.into_result(None)
    }

    fn describe(&self) -> String {
        format!("memory://{}", self.spreadsheet_id)
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

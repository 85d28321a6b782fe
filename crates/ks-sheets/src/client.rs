//! The resilient spreadsheet client.
//!
//! Every call is validated locally, authenticated, optionally counted
//! against a client-side quota, then sent through the retry policy: one
//! transport round trip per attempt.

use crate::auth::{Authenticator, NoAuth};
use crate::error::{SheetsError, SheetsResult};
use crate::operation::Operation;
use crate::quota::QuotaGuard;
use crate::response::ApiResponse;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::transport::Transport;
use ks_core::a1;
use ks_core::cell::grid_width;
use ks_core::{Grid, SheetName, SpreadsheetId};
use std::sync::Arc;

/// Quota key used for this process's own requests.
const LOCAL_CLIENT: &str = "local";

pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    spreadsheet: SpreadsheetId,
    auth: Arc<dyn Authenticator>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    quota: Option<QuotaGuard>,
}

impl ResilientClient {
    pub fn new(transport: Arc<dyn Transport>, spreadsheet: SpreadsheetId) -> Self {
        Self {
            transport,
            spreadsheet,
            auth: Arc::new(NoAuth),
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            quota: None,
        }
    }

    pub fn with_auth(mut self, auth: Arc<dyn Authenticator>) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_quota(mut self, quota: QuotaGuard) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn spreadsheet(&self) -> &SpreadsheetId {
        &self.spreadsheet
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The sleeper used for backoff, shared so callers can pause on the
    /// same clock.
    pub fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    /// Validate and send `op` with retries.
    ///
    /// Local validation failures return immediately without a request.
    /// For [`Operation::CreateSheet`] an "already exists" reply counts as
    /// success.
    pub async fn execute(&self, op: Operation) -> SheetsResult<ApiResponse> {
        op.validate()?;

        let mut request = op.to_request(&self.spreadsheet);
        self.auth.apply(&mut request);

        let action = op.action();
        let label = match op.sheet() {
            Some(sheet) => format!("{} '{}'", action, sheet),
            None => action.to_string(),
        };
        log::debug!("{} via {}", label, self.transport.describe());

        let request = &request;
        let transport = &self.transport;
        let quota = self.quota.as_ref();
        let is_create = matches!(op, Operation::CreateSheet { .. });

        self.policy
            .run(self.sleeper.as_ref(), &label, move |_attempt| async move {
                if let Some(Err(e)) = quota.map(|q| q.check(LOCAL_CLIENT)) {
                    return Err(e);
                }
                match transport.send(request).await {
                    Err(SheetsError::ProvisionConflict(message)) if is_create => {
                        log::debug!("Sheet already present: {}", message);
                        Ok(ApiResponse {
                            success: Some(true),
                            message: Some(message),
                            ..ApiResponse::default()
                        })
                    }
                    other => other,
                }
            })
            .await
    }

    /// Read the used range of `sheet`.
    pub async fn read(&self, sheet: &SheetName) -> SheetsResult<Grid> {
        let response = self
            .execute(Operation::Read {
                sheet: sheet.clone(),
            })
            .await?;
        Ok(response.data.unwrap_or_default())
    }

    /// Write `values` into `range`.
    pub async fn update_range(
        &self,
        sheet: &SheetName,
        range: &str,
        values: Grid,
    ) -> SheetsResult<ApiResponse> {
        self.execute(Operation::UpdateRange {
            sheet: sheet.clone(),
            range: range.to_string(),
            values,
        })
        .await
    }

    /// Write `values` anchored at `A1`, sizing the range from the grid.
    pub async fn update_from_a1(&self, sheet: &SheetName, values: Grid) -> SheetsResult<ApiResponse> {
        let range = a1::range_for(values.len(), grid_width(&values));
        self.update_range(sheet, &range, values).await
    }

    pub async fn append_rows(&self, sheet: &SheetName, rows: Grid) -> SheetsResult<ApiResponse> {
        self.execute(Operation::AppendRows {
            sheet: sheet.clone(),
            rows,
        })
        .await
    }

    pub async fn overwrite(&self, sheet: &SheetName, values: Grid) -> SheetsResult<ApiResponse> {
        self.execute(Operation::Overwrite {
            sheet: sheet.clone(),
            values,
        })
        .await
    }

    pub async fn clear(&self, sheet: &SheetName, range: Option<&str>) -> SheetsResult<ApiResponse> {
        self.execute(Operation::Clear {
            sheet: sheet.clone(),
            range: range.map(str::to_string),
        })
        .await
    }

    /// Names of every sheet in the spreadsheet.
    pub async fn list_sheets(&self) -> SheetsResult<Vec<String>> {
        let response = self.execute(Operation::ListSheets).await?;
        Ok(response.sheet_names.unwrap_or_default())
    }

    /// Create `sheet`; succeeds if it already exists.
    pub async fn create_sheet(&self, sheet: &SheetName) -> SheetsResult<ApiResponse> {
        self.execute(Operation::CreateSheet {
            sheet: sheet.clone(),
        })
        .await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

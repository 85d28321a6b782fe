//! Error types for ks-sheets

use thiserror::Error;

/// Longest remote message kept in an error.
pub const MAX_MESSAGE_LEN: usize = 500;

/// Errors from the spreadsheet web app or the path to it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetsError {
    /// S001: Missing or invalid request parameter
    #[error("[S001] Invalid request: {0}")]
    Validation(String),

    /// S002: Unknown spreadsheet or sheet
    #[error("[S002] Not found: {0}")]
    NotFound(String),

    /// S003: Request quota exceeded
    #[error("[S003] Rate limited: {0}")]
    RateLimited(String),

    /// S004: Network failure or timeout
    #[error("[S004] Transient network error: {0}")]
    Transient(String),

    /// S005: The sheet being created already exists
    #[error("[S005] Already exists: {0}")]
    ProvisionConflict(String),

    /// S006: Missing or rejected credentials
    #[error("[S006] Unauthorized: {0}")]
    Unauthorized(String),

    /// S007: Unexpected failure inside the web app
    #[error("[S007] Internal error: {0}")]
    Internal(String),

    /// S008: Response body could not be decoded
    #[error("[S008] Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for SheetsError
pub type SheetsResult<T> = Result<T, SheetsError>;

impl SheetsError {
    /// Classify a remote failure by HTTP status and message text.
    pub fn from_remote(status: Option<u16>, message: &str) -> Self {
        let message = truncate_message(message);
        let lower = message.to_lowercase();
        if lower.contains("already exists") {
            return SheetsError::ProvisionConflict(message);
        }
        match status {
            Some(400) => SheetsError::Validation(message),
            Some(401) | Some(403) => SheetsError::Unauthorized(message),
            Some(404) => SheetsError::NotFound(message),
            Some(429) => SheetsError::RateLimited(message),
            Some(408) | Some(502) | Some(503) | Some(504) => SheetsError::Transient(message),
            _ => SheetsError::Internal(message),
        }
    }

    /// The message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            SheetsError::Validation(m)
            | SheetsError::NotFound(m)
            | SheetsError::RateLimited(m)
            | SheetsError::Transient(m)
            | SheetsError::ProvisionConflict(m)
            | SheetsError::Unauthorized(m)
            | SheetsError::Internal(m)
            | SheetsError::InvalidResponse(m) => m,
        }
    }
}

/// Cut `message` to [`MAX_MESSAGE_LEN`] characters.
pub fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_MESSAGE_LEN {
        message.to_string()
    } else {
        let cut: String = message.chars().take(MAX_MESSAGE_LEN).collect();
        format!("{cut}...")
    }
}

impl From<reqwest::Error> for SheetsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SheetsError::Transient(format!("request timed out: {err}"))
        } else if err.is_connect() {
            SheetsError::Transient(format!("connection failed: {err}"))
        } else if err.is_decode() {
            SheetsError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            SheetsError::from_remote(Some(status.as_u16()), &err.to_string())
        } else {
            SheetsError::Transient(err.to_string())
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

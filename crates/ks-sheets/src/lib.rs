//! ks-sheets - Client for the kpisync spreadsheet web app
//!
//! This crate provides the closed `Operation` set accepted by the web app,
//! the `ResilientClient` that validates, authenticates and retries them, and
//! two transports: HTTPS via reqwest and the in-memory `MemoryWorkbook`.

pub mod auth;
pub mod client;
pub mod error;
pub mod memory;
pub mod operation;
pub mod quota;
pub mod response;
pub mod retry;
pub mod transport;

pub use auth::{ApiKeyAuth, Authenticator, NoAuth, TokenAuth};
pub use client::ResilientClient;
pub use error::{SheetsError, SheetsResult};
pub use memory::{AccessLogEntry, MemoryWorkbook};
pub use operation::{Action, Method, Operation, PostBody, WireRequest};
pub use quota::{Clock, InMemoryRateLimitStore, QuotaGuard, RateLimitStore, SystemClock};
pub use response::ApiResponse;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use transport::{HttpTransport, Transport};

#[cfg(any(test, feature = "test-support"))]
pub use quota::ManualClock;
#[cfg(any(test, feature = "test-support"))]
pub use retry::RecordingSleeper;

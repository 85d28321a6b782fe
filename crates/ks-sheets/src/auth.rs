//! Pluggable request authentication.
//!
//! Credentials travel as query parameters so the same scheme works for both
//! GET reads and POST writes.

use crate::operation::WireRequest;
use ks_core::{AuthConfig, AuthKind, CoreResult};
use std::fmt;
use std::sync::Arc;

/// Query parameter carrying a shared-secret token.
pub const TOKEN_PARAM: &str = "token";
/// Query parameter carrying a pre-shared API key.
pub const API_KEY_PARAM: &str = "apiKey";

/// Attaches credentials to outgoing requests.
pub trait Authenticator: Send + Sync + fmt::Debug {
    fn apply(&self, request: &mut WireRequest);

    /// Scheme name for logging
    fn scheme(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl Authenticator for NoAuth {
    fn apply(&self, _request: &mut WireRequest) {}

    fn scheme(&self) -> &'static str {
        "none"
    }
}

/// Sends a shared secret checked against the web app's allow-list.
#[derive(Clone)]
pub struct TokenAuth {
    token: String,
}

impl TokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Authenticator for TokenAuth {
    fn apply(&self, request: &mut WireRequest) {
        request.push_param(TOKEN_PARAM, self.token.clone());
    }

    fn scheme(&self) -> &'static str {
        "token"
    }
}

impl fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuth").field("token", &"***").finish()
    }
}

/// Sends a pre-shared key stored in the web app's configuration.
#[derive(Clone)]
pub struct ApiKeyAuth {
    key: String,
}

impl ApiKeyAuth {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Authenticator for ApiKeyAuth {
    fn apply(&self, request: &mut WireRequest) {
        request.push_param(API_KEY_PARAM, self.key.clone());
    }

    fn scheme(&self) -> &'static str {
        "api_key"
    }
}

impl fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuth").field("key", &"***").finish()
    }
}

/// Build the authenticator described by `config`, reading its secret from
/// the environment.
pub fn from_config(config: &AuthConfig) -> CoreResult<Arc<dyn Authenticator>> {
    let secret = config.secret()?;
    Ok(match (config.kind, secret) {
        (AuthKind::Token, Some(token)) => Arc::new(TokenAuth::new(token)),
        (AuthKind::ApiKey, Some(key)) => Arc::new(ApiKeyAuth::new(key)),
        _ => Arc::new(NoAuth),
    })
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

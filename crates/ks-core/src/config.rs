//! Configuration types and parsing for kpisync.yml

use crate::destination::{DestinationResolver, ResolveStrategy, Role};
use crate::error::{CoreError, CoreResult};
use crate::names::{SheetName, SpreadsheetId};
use crate::row::{CanonicalField, ColumnMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Environment variable holding the web app URL.
pub const ENV_WEB_APP_URL: &str = "GOOGLE_SHEETS_WEB_APP_URL";
/// Environment variable holding the spreadsheet id or URL.
pub const ENV_SHEET_ID: &str = "GOOGLE_SHEETS_SHEET_ID";

/// Project configuration from kpisync.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Deployed web app endpoint (`https://...`)
    #[serde(default)]
    pub web_app_url: Option<String>,

    /// Spreadsheet id, or a full spreadsheet URL containing `/d/<id>/`
    #[serde(default)]
    pub sheet_id: Option<String>,

    /// Whether secondary views get literal values or formulas
    #[serde(default)]
    pub update_mode: UpdateMode,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Pause before each sheet provisioning call, in milliseconds
    #[serde(default = "default_provision_pause_ms")]
    pub provision_pause_ms: u64,

    /// Per-request HTTP timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Rows on the top performers view
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default)]
    pub destinations: DestinationConfig,

    /// Extra source header → canonical field mappings
    #[serde(default)]
    pub columns: HashMap<String, CanonicalField>,

    /// Optional client-side request quota
    #[serde(default)]
    pub quota: Option<QuotaConfig>,
}

/// How secondary views are populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Every view carries computed literal values
    #[default]
    Direct,
    /// Only the main data is literal; other views reference it by formula
    Formula,
}

impl UpdateMode {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateMode::Direct => "direct",
            UpdateMode::Formula => "formula",
        }
    }
}

impl std::fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication scheme expected by the web app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    #[default]
    None,
    /// Shared secret sent as the `token` parameter
    Token,
    /// Pre-shared key sent as the `apiKey` parameter
    ApiKey,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(default)]
    pub kind: AuthKind,

    /// Environment variable holding the secret
    #[serde(default)]
    pub env: Option<String>,
}

impl AuthConfig {
    /// Variable name the secret is read from.
    pub fn env_var(&self) -> Option<&str> {
        match (self.kind, self.env.as_deref()) {
            (AuthKind::None, _) => None,
            (_, Some(name)) => Some(name),
            (AuthKind::Token, None) => Some("KPISYNC_TOKEN"),
            (AuthKind::ApiKey, None) => Some("KPISYNC_API_KEY"),
        }
    }

    /// Read the secret from the environment.
    ///
    /// `Ok(None)` when no authentication is configured; an error when it is
    /// configured but the variable is unset or empty.
    pub fn secret(&self) -> CoreResult<Option<String>> {
        let Some(var) = self.env_var() else {
            return Ok(None);
        };
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
            _ => Err(CoreError::ConfigInvalid {
                message: format!(
                    "auth.kind is '{}' but environment variable {} is not set",
                    match self.kind {
                        AuthKind::Token => "token",
                        AuthKind::ApiKey => "api_key",
                        AuthKind::None => "none",
                    },
                    var
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestinationConfig {
    #[serde(default)]
    pub strategy: ResolveStrategy,

    #[serde(default)]
    pub main_data: Option<SheetName>,

    #[serde(default)]
    pub summary: Option<SheetName>,

    #[serde(default)]
    pub top_performers: Option<SheetName>,

    #[serde(default)]
    pub pivot: Option<SheetName>,
}

impl DestinationConfig {
    /// Build a resolver carrying the strategy and any pinned sheets.
    pub fn resolver(&self) -> DestinationResolver {
        let pinned = [
            (Role::MainData, &self.main_data),
            (Role::Summary, &self.summary),
            (Role::TopPerformers, &self.top_performers),
            (Role::Pivot, &self.pivot),
        ];
        pinned
            .into_iter()
            .fold(DestinationResolver::new(self.strategy), |resolver, (role, sheet)| {
                match sheet {
                    Some(sheet) => resolver.with_override(role, sheet.clone()),
                    None => resolver,
                }
            })
    }
}

/// Sliding-window request cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaConfig {
    pub max_requests: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_provision_pause_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_top_n() -> usize {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_secs() -> f64 {
    1.0
}

fn default_window_secs() -> u64 {
    3600
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_app_url: None,
            sheet_id: None,
            update_mode: UpdateMode::default(),
            auth: AuthConfig::default(),
            retry: RetryConfig::default(),
            provision_pause_ms: default_provision_pause_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            top_n: default_top_n(),
            destinations: DestinationConfig::default(),
            columns: HashMap::new(),
            quota: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load kpisync.yml or kpisync.yaml from `dir`, or defaults when
    /// neither exists.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("kpisync.yml");
        let yaml_path = dir.join("kpisync.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            log::debug!("No kpisync.yml in {}, using defaults", dir.display());
            Ok(Self::default())
        }
    }

    /// Replace the endpoint settings with values from the environment
    /// when those are set.
    pub fn apply_env_overrides(&mut self) {
        self.override_endpoint(
            std::env::var(ENV_WEB_APP_URL).ok(),
            std::env::var(ENV_SHEET_ID).ok(),
        );
    }

    /// Replace the endpoint settings with any non-empty values given.
    pub fn override_endpoint(&mut self, web_app_url: Option<String>, sheet_id: Option<String>) {
        if let Some(url) = web_app_url.filter(|u| !u.trim().is_empty()) {
            self.web_app_url = Some(url);
        }
        if let Some(id) = sheet_id.filter(|s| !s.trim().is_empty()) {
            self.sheet_id = Some(id);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(url) = &self.web_app_url {
            if !url.starts_with("https://") {
                return Err(CoreError::ConfigInvalid {
                    message: format!("web_app_url must start with https:// (got '{}')", url),
                });
            }
        }

        if let Some(id) = &self.sheet_id {
            if SpreadsheetId::from_url_or_id(id).is_none() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("sheet_id '{}' does not contain a spreadsheet id", id),
                });
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "retry.max_attempts must be at least 1".to_string(),
            });
        }

        if !self.retry.base_delay_secs.is_finite() || self.retry.base_delay_secs < 0.0 {
            return Err(CoreError::ConfigInvalid {
                message: "retry.base_delay_secs must be a non-negative number".to_string(),
            });
        }

        if self.top_n == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "top_n must be at least 1".to_string(),
            });
        }

        if let Some(quota) = &self.quota {
            if quota.max_requests == 0 || quota.window_secs == 0 {
                return Err(CoreError::ConfigInvalid {
                    message: "quota.max_requests and quota.window_secs must be positive"
                        .to_string(),
                });
            }
        }

        Ok(())
    }

    /// Names of required endpoint settings that are still unset.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.web_app_url.is_none() {
            missing.push(ENV_WEB_APP_URL);
        }
        if self.sheet_id.is_none() {
            missing.push(ENV_SHEET_ID);
        }
        missing
    }

    /// The endpoint URL, or an error naming the missing variable.
    pub fn require_web_app_url(&self) -> CoreResult<&str> {
        self.web_app_url
            .as_deref()
            .ok_or_else(|| CoreError::ConfigInvalid {
                message: format!("web_app_url is not set (config or {})", ENV_WEB_APP_URL),
            })
    }

    /// The spreadsheet id, extracted from a URL when necessary.
    pub fn require_spreadsheet_id(&self) -> CoreResult<SpreadsheetId> {
        let raw = self
            .sheet_id
            .as_deref()
            .ok_or_else(|| CoreError::ConfigInvalid {
                message: format!("sheet_id is not set (config or {})", ENV_SHEET_ID),
            })?;
        SpreadsheetId::from_url_or_id(raw).ok_or_else(|| CoreError::ConfigInvalid {
            message: format!("sheet_id '{}' does not contain a spreadsheet id", raw),
        })
    }

    /// Column map with the configured extra headers applied.
    pub fn column_map(&self) -> ColumnMap {
        ColumnMap::with_overrides(&self.columns)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

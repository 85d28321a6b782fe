//! Per-client request quotas.
//!
//! Counters live behind [`RateLimitStore`] so the window bookkeeping can be
//! swapped (in-memory here, a shared cache elsewhere) and driven by a
//! controllable [`Clock`] in tests.

use crate::error::{SheetsError, SheetsResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

#[cfg(any(test, feature = "test-support"))]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let (Ok(mut now), Ok(delta)) = (self.now.lock(), chrono::Duration::from_std(by)) {
            *now += delta;
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|n| *n).unwrap_or_else(|_| Utc::now())
    }
}

/// Windowed counters keyed by client.
pub trait RateLimitStore: Send + Sync {
    /// Requests counted for `key` in its current window.
    fn get(&self, key: &str) -> u32;

    /// Count one request. A key without a live window starts a new one
    /// lasting `window`. Returns the new count.
    fn increment(&self, key: &str, window: Duration) -> u32;

    /// Drop the counter for `key`.
    fn expire(&self, key: &str);
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    expires_at: DateTime<Utc>,
}

/// Process-local [`RateLimitStore`].
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRateLimitStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

impl Default for InMemoryRateLimitStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn get(&self, key: &str) -> u32 {
        let now = self.clock.now();
        let Ok(windows) = self.windows.lock() else {
            return 0;
        };
        windows
            .get(key)
            .filter(|w| w.expires_at > now)
            .map_or(0, |w| w.count)
    }

    fn increment(&self, key: &str, window: Duration) -> u32 {
        let now = self.clock.now();
        let span = chrono::Duration::from_std(window).unwrap_or_else(|_| chrono::Duration::days(3650));
        let Ok(mut windows) = self.windows.lock() else {
            return 0;
        };
        let entry = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            expires_at: now,
        });
        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = now.checked_add_signed(span).unwrap_or(DateTime::<Utc>::MAX_UTC);
        }
        entry.count = entry.count.saturating_add(1);
        entry.count
    }

    fn expire(&self, key: &str) {
        if let Ok(mut windows) = self.windows.lock() {
            windows.remove(key);
        }
    }
}

/// Caps each client at `max_requests` per `window`.
#[derive(Clone)]
pub struct QuotaGuard {
    store: Arc<dyn RateLimitStore>,
    max_requests: u32,
    window: Duration,
}

impl QuotaGuard {
    pub fn new(store: Arc<dyn RateLimitStore>, max_requests: u32, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    /// Guard backed by an [`InMemoryRateLimitStore`] on the system clock.
    pub fn in_memory(config: &ks_core::config::QuotaConfig) -> Self {
        Self::new(
            Arc::new(InMemoryRateLimitStore::default()),
            config.max_requests,
            Duration::from_secs(config.window_secs),
        )
    }

    /// Count a request from `client`, or fail with
    /// [`SheetsError::RateLimited`] when its window is full.
    pub fn check(&self, client: &str) -> SheetsResult<()> {
        let used = self.store.get(client);
        if used >= self.max_requests {
            log::debug!("Quota exhausted for '{}' ({} requests)", client, used);
            return Err(SheetsError::RateLimited(format!(
                "Rate limit exceeded: {} requests per {}s",
                self.max_requests,
                self.window.as_secs()
            )));
        }
        self.store.increment(client, self.window);
        Ok(())
    }

    /// Requests left for `client` in its current window.
    pub fn remaining(&self, client: &str) -> u32 {
        self.max_requests.saturating_sub(self.store.get(client))
    }
}

impl std::fmt::Debug for QuotaGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaGuard")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .finish()
    }
}

#[cfg(test)]
#[path = "quota_test.rs"]
mod tests;

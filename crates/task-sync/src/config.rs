//! API Configuration
//!
//! Where the task API lives and how often the client resyncs with it.
//! Values come from the environment with defaults for local development.

use std::time::Duration;

use crate::error::{SyncError, SyncResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Base URL of the task API
pub const API_URL_VAR: &str = "TODO_API_URL";
/// Poll interval in milliseconds
pub const POLL_INTERVAL_VAR: &str = "TODO_POLL_INTERVAL_MS";
/// Per-request timeout in seconds (native only)
pub const REQUEST_TIMEOUT_VAR: &str = "TODO_REQUEST_TIMEOUT_SECS";

/// Connection settings for the remote task store
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:8000/api`
    pub base_url: String,
    /// Interval between full refreshes
    pub poll_interval: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build from a variable lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::default();
        if let Some(url) = get(API_URL_VAR) {
            config.base_url = url;
        }
        if let Some(ms) = get(POLL_INTERVAL_VAR) {
            config.poll_interval = Duration::from_millis(parse_number(POLL_INTERVAL_VAR, &ms)?);
        }
        if let Some(secs) = get(REQUEST_TIMEOUT_VAR) {
            config.request_timeout = Duration::from_secs(parse_number(REQUEST_TIMEOUT_VAR, &secs)?);
        }
        config.validate()?;
        Ok(config)
    }

    /// Build from the process environment
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> SyncResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from values baked in at compile time.
    ///
    /// The browser has no process environment, so the page reads the
    /// variables as they were when the bundle was built.
    pub fn from_build_env() -> SyncResult<Self> {
        Self::from_lookup(|key| {
            let value = match key {
                API_URL_VAR => option_env!("TODO_API_URL"),
                POLL_INTERVAL_VAR => option_env!("TODO_POLL_INTERVAL_MS"),
                REQUEST_TIMEOUT_VAR => option_env!("TODO_REQUEST_TIMEOUT_SECS"),
                _ => None,
            };
            value.map(String::from)
        })
    }

    pub fn validate(&self) -> SyncResult<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| SyncError::Config(format!("invalid API URL {:?}: {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SyncError::Config(format!(
                "API URL must be http or https, got {:?}",
                self.base_url
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(SyncError::Config("poll interval must be greater than 0".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(SyncError::Config("request timeout must be greater than 0".into()));
        }
        Ok(())
    }

    /// Join `path` onto the base URL with exactly one slash between them
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_number(key: &str, value: &str) -> SyncResult<u64> {
    value
        .parse::<u64>()
        .map_err(|_| SyncError::Config(format!("{key} must be a whole number, got {value:?}")))
}

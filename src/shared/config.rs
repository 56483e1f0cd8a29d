//! Application configuration. Poll API endpoint, timings, display theme.

use crate::domain::session::DEFAULT_NOTICE_TTL;
use crate::usecases::results_service::DEFAULT_REFRESH_INTERVAL;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";

/// Color scheme for the terminal UI. Only the rendering layer reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Poll API root. Read from ELECTION_POLL_API_BASE_URL.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Per-request timeout in seconds (default 10). Read from ELECTION_POLL_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Seconds between results refreshes (default 30). Read from ELECTION_POLL_RESULTS_REFRESH_SECS.
    #[serde(default)]
    pub results_refresh_secs: Option<u64>,

    /// How long transient notices stay visible (default 3). Read from ELECTION_POLL_NOTICE_SECS.
    #[serde(default)]
    pub notice_secs: Option<u64>,

    /// Use the in-memory API instead of HTTP. Read from ELECTION_POLL_OFFLINE.
    #[serde(default)]
    pub offline: Option<bool>,

    #[serde(default)]
    pub theme: Option<Theme>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        Self::load_from(std::env::var("ELECTION_POLL_CONFIG").ok().as_deref())
    }

    /// Optional file at `path`, then `ELECTION_POLL_*` env on top.
    /// A missing file is skipped so env values still apply.
    pub fn load_from(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut c = config::Config::builder();
        if let Some(path) = path {
            c = c.add_source(config::File::with_name(path).required(false));
        }
        c = c.add_source(config::Environment::with_prefix("ELECTION_POLL"));
        c.build()?.try_deserialize()
    }

    pub fn api_base_url_or_default(&self) -> String {
        self.api_base_url
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.filter(|s| *s > 0).unwrap_or(10))
    }

    /// Zero is treated as unset; the dashboard never polls in a tight loop.
    pub fn results_refresh(&self) -> Duration {
        self.results_refresh_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL)
    }

    pub fn notice_ttl(&self) -> Duration {
        self.notice_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_NOTICE_TTL)
    }

    pub fn is_offline(&self) -> bool {
        self.offline.unwrap_or(false)
    }

    pub fn theme_or_default(&self) -> Theme {
        self.theme.unwrap_or_default()
    }
}

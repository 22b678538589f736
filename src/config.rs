//! Configuration management for rtorrent-reaper.

use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::duration::serde_compact;
use crate::error::{ReaperError, Result};
use crate::ratelimit::{DEFAULT_CAPACITY, DEFAULT_PERIOD, DEFAULT_TIMEOUT};
use crate::rpc::DEFAULT_VIEW;
use crate::sweep::evaluator::{DEFAULT_MIN_IDLE, DEFAULT_UPLOAD_THRESHOLD_KBPS};
use crate::sweep::Policy;

/// Prefix for environment overrides, e.g. `RTORRENT_REAPER__POLICY__DRY_RUN`.
pub const ENV_PREFIX: &str = "RTORRENT_REAPER";

/// Main configuration for the reaper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaperConfig {
    /// Daemon connection
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Deletion policy
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Outbound request throttling
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Abandon the sweep after this long, keeping the partial result
    #[serde(default, with = "serde_compact::option")]
    pub deadline: Option<Duration>,
}

/// Daemon connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// XML-RPC endpoint, e.g. `https://host/RPC2`
    #[serde(default)]
    pub url: Option<String>,

    /// HTTP basic auth username
    #[serde(default)]
    pub username: Option<String>,

    /// HTTP basic auth password
    #[serde(default)]
    pub password: Option<String>,

    /// View to sweep
    #[serde(default = "default_view")]
    pub view: String,

    /// Per-request timeout
    #[serde(default = "default_timeout", with = "serde_compact")]
    pub timeout: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            view: default_view(),
            timeout: default_timeout(),
        }
    }
}

fn default_view() -> String {
    DEFAULT_VIEW.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Deletion policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Idle time after the last state change before a torrent may go
    #[serde(default = "default_wait", with = "serde_compact")]
    pub wait: Duration,

    /// Log deletions without performing them
    #[serde(default)]
    pub dry_run: bool,

    /// Spare torrents uploading at or above this many KB/s; 0 disables
    #[serde(default = "default_skip_ul_speed")]
    pub skip_ul_speed: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            wait: default_wait(),
            dry_run: false,
            skip_ul_speed: default_skip_ul_speed(),
        }
    }
}

fn default_wait() -> Duration {
    DEFAULT_MIN_IDLE
}

fn default_skip_ul_speed() -> u64 {
    DEFAULT_UPLOAD_THRESHOLD_KBPS
}

impl PolicyConfig {
    /// Resolve into the policy the sweep evaluates against.
    pub fn to_policy(&self) -> Policy {
        Policy {
            min_idle: self.wait,
            dry_run: self.dry_run,
            upload_threshold_kbps: (self.skip_ul_speed > 0).then_some(self.skip_ul_speed),
        }
    }
}

/// Throttle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Requests admitted per period
    #[serde(default = "default_requests")]
    pub requests: u32,

    /// Sliding window length
    #[serde(default = "default_period", with = "serde_compact")]
    pub period: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            requests: default_requests(),
            period: default_period(),
        }
    }
}

fn default_requests() -> u32 {
    DEFAULT_CAPACITY
}

fn default_period() -> Duration {
    DEFAULT_PERIOD
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ReaperConfig {
    /// Load defaults, then the optional file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Check the resolved configuration and return the parsed daemon URL.
    pub fn validate(&self) -> Result<Url> {
        if self.throttle.requests == 0 {
            return Err(ReaperError::Config(
                "throttle.requests must be at least 1".to_string(),
            ));
        }
        if self.throttle.period.is_zero() {
            return Err(ReaperError::Config(
                "throttle.period must be greater than zero".to_string(),
            ));
        }
        if self.daemon.timeout.is_zero() {
            return Err(ReaperError::Config(
                "daemon.timeout must be greater than zero".to_string(),
            ));
        }

        let raw = self
            .daemon
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ReaperError::Config("daemon URL is required".to_string()))?;

        Url::parse(raw).map_err(|e| ReaperError::Config(format!("invalid daemon URL '{raw}': {e}")))
    }
}

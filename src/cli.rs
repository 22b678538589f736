//! Command-line arguments and how they override the loaded configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::{LogFormat, ReaperConfig};
use crate::duration::parse_duration;

/// Remove finished, idle torrents from an rTorrent daemon.
#[derive(Debug, Parser)]
#[command(name = "rtorrent-reaper")]
#[command(version, about, long_about = None)]
#[command(override_usage = "rtorrent-reaper [OPTIONS] <URL>")]
pub struct Cli {
    /// rTorrent XML-RPC endpoint, e.g. https://seedbox/RPC2
    pub url: Option<String>,

    /// HTTP Basic Authentication username
    #[arg(long)]
    pub username: Option<String>,

    /// HTTP Basic Authentication password
    #[arg(long, env = "RTORRENT_REAPER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Minimum time after a finished torrent stopped before it is deleted [default: 1h]
    #[arg(long, value_parser = parse_duration)]
    pub wait: Option<Duration>,

    /// Do not actually delete torrents
    #[arg(long)]
    pub dry_run: bool,

    /// Keep torrents uploading at or above this many KB/s, 0 to disable [default: 1024]
    #[arg(long, value_name = "KBPS")]
    pub skip_ul_speed: Option<u64>,

    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// rTorrent view to sweep [default: main]
    #[arg(long)]
    pub view: Option<String>,

    /// Per-request timeout [default: 5s]
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Requests admitted per rate-limit period [default: 1]
    #[arg(long, value_name = "N")]
    pub rate_limit: Option<u32>,

    /// Rate-limit period [default: 1s]
    #[arg(long, value_parser = parse_duration)]
    pub rate_period: Option<Duration>,

    /// Stop the sweep after this long and report what was done
    #[arg(long, value_parser = parse_duration)]
    pub deadline: Option<Duration>,

    /// Log filter used when RUST_LOG is unset [default: info]
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<CliLogFormat>,
}

/// Log output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliLogFormat {
    /// Human-readable lines
    Pretty,
    /// JSON lines
    Json,
}

impl From<CliLogFormat> for LogFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Pretty => LogFormat::Pretty,
            CliLogFormat::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    /// Overlay every flag that was given onto `config`.
    pub fn apply(&self, config: &mut ReaperConfig) {
        if let Some(ref url) = self.url {
            config.daemon.url = Some(url.clone());
        }
        if let Some(ref username) = self.username {
            config.daemon.username = Some(username.clone());
        }
        if let Some(ref password) = self.password {
            config.daemon.password = Some(password.clone());
        }
        if let Some(ref view) = self.view {
            config.daemon.view = view.clone();
        }
        if let Some(timeout) = self.timeout {
            config.daemon.timeout = timeout;
        }

        if let Some(wait) = self.wait {
            config.policy.wait = wait;
        }
        if self.dry_run {
            config.policy.dry_run = true;
        }
        if let Some(speed) = self.skip_ul_speed {
            config.policy.skip_ul_speed = speed;
        }

        if let Some(requests) = self.rate_limit {
            config.throttle.requests = requests;
        }
        if let Some(period) = self.rate_period {
            config.throttle.period = period;
        }

        if let Some(deadline) = self.deadline {
            config.deadline = Some(deadline);
        }

        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format.into();
        }
    }
}

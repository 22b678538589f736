//! Deletion eligibility rules.
//!
//! Each rule is a standalone function so the orchestrator can stop fetching
//! attributes as soon as one of them decides to keep a torrent. [`evaluate`]
//! applies the same rules, in the same order, to a fully known torrent.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::torrent::TorrentState;

/// Default grace period after the last state change.
pub const DEFAULT_MIN_IDLE: Duration = Duration::from_secs(3600);
/// Default upload rate above which a torrent is spared, in KB/s.
pub const DEFAULT_UPLOAD_THRESHOLD_KBPS: u64 = 1024;

/// Resolved deletion policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// How long a torrent must have been idle since its last state change
    pub min_idle: Duration,
    /// Count deletions without issuing them
    pub dry_run: bool,
    /// Spare torrents uploading at or above this rate (KB/s); `None` disables
    pub upload_threshold_kbps: Option<u64>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            min_idle: DEFAULT_MIN_IDLE,
            dry_run: false,
            upload_threshold_kbps: Some(DEFAULT_UPLOAD_THRESHOLD_KBPS),
        }
    }
}

/// Why a torrent was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepReason {
    StillDownloading,
    StillSeeding,
    GracePeriod,
    ActiveUpload,
}

impl fmt::Display for KeepReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            KeepReason::StillDownloading => "still downloading",
            KeepReason::StillSeeding => "still seeding",
            KeepReason::GracePeriod => "grace period not elapsed",
            KeepReason::ActiveUpload => "active upload above threshold",
        };
        f.write_str(reason)
    }
}

/// Outcome of evaluating one torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep(KeepReason),
    Delete,
}

/// Everything the rules look at for one torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentFacts {
    pub completed: bool,
    pub state: TorrentState,
    pub state_changed: DateTime<Utc>,
    /// Upload rate in bytes/sec
    pub up_rate: u64,
}

/// Rule 1: unfinished downloads are kept.
pub fn check_completion(completed: bool) -> Option<KeepReason> {
    (!completed).then_some(KeepReason::StillDownloading)
}

/// Rule 2: torrents the daemon still holds open for seeding are kept.
pub fn check_seeding(state: TorrentState) -> Option<KeepReason> {
    state.is_seeding().then_some(KeepReason::StillSeeding)
}

/// Rule 3: torrents whose state changed within `min_idle` of `now` are kept.
///
/// The grace period must be strictly exceeded; a deadline that cannot be
/// represented is treated as never reached.
pub fn check_grace(
    state_changed: DateTime<Utc>,
    policy: &Policy,
    now: DateTime<Utc>,
) -> Option<KeepReason> {
    let eligible_after = TimeDelta::from_std(policy.min_idle)
        .ok()
        .and_then(|idle| state_changed.checked_add_signed(idle));

    match eligible_after {
        Some(deadline) if now > deadline => None,
        _ => Some(KeepReason::GracePeriod),
    }
}

/// Rule 4: torrents uploading at or above the threshold are kept.
pub fn check_upload(up_rate: u64, policy: &Policy) -> Option<KeepReason> {
    let threshold = policy.upload_threshold_kbps?;
    (up_rate >= threshold.saturating_mul(1024)).then_some(KeepReason::ActiveUpload)
}

/// Apply every rule in order; the first one to keep the torrent wins.
pub fn evaluate(facts: &TorrentFacts, policy: &Policy, now: DateTime<Utc>) -> Decision {
    let kept = check_completion(facts.completed)
        .or_else(|| check_seeding(facts.state))
        .or_else(|| check_grace(facts.state_changed, policy, now))
        .or_else(|| check_upload(facts.up_rate, policy));

    match kept {
        Some(reason) => Decision::Keep(reason),
        None => Decision::Delete,
    }
}

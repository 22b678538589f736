//! Per-run outcome counters.

use super::evaluator::KeepReason;

/// What happened to a single torrent during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Kept(KeepReason),
    /// Deleted, or counted as deleted in dry-run mode
    Deleted,
    DeleteFailed,
    /// An attribute could not be fetched; the torrent is left alone this run
    FetchFailed,
}

/// Aggregated counters for one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepResult {
    /// Torrents returned by the list call
    pub total: usize,
    pub skipped_incomplete: usize,
    pub skipped_still_seeding: usize,
    pub skipped_recently_changed: usize,
    pub skipped_active_upload: usize,
    pub deleted: usize,
    pub delete_failed: usize,
    pub fetch_failed: usize,
    /// Deletions were simulated
    pub dry_run: bool,
    /// The sweep stopped early; counters cover only the torrents processed
    pub cancelled: bool,
}

impl SweepResult {
    /// Create an empty result for a run over `total` torrents.
    pub fn new(total: usize, dry_run: bool) -> Self {
        Self {
            total,
            dry_run,
            ..Self::default()
        }
    }

    /// Count one torrent's outcome.
    pub fn record(&mut self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Kept(KeepReason::StillDownloading) => &mut self.skipped_incomplete,
            Outcome::Kept(KeepReason::StillSeeding) => &mut self.skipped_still_seeding,
            Outcome::Kept(KeepReason::GracePeriod) => &mut self.skipped_recently_changed,
            Outcome::Kept(KeepReason::ActiveUpload) => &mut self.skipped_active_upload,
            Outcome::Deleted => &mut self.deleted,
            Outcome::DeleteFailed => &mut self.delete_failed,
            Outcome::FetchFailed => &mut self.fetch_failed,
        };
        *counter += 1;
    }

    /// Number of torrents with a recorded outcome.
    pub fn processed(&self) -> usize {
        self.kept() + self.deleted + self.delete_failed + self.fetch_failed
    }

    /// Number of torrents kept by a rule.
    pub fn kept(&self) -> usize {
        self.skipped_incomplete
            + self.skipped_still_seeding
            + self.skipped_recently_changed
            + self.skipped_active_upload
    }
}

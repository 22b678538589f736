//! Torrent records as reported by the daemon.

use std::fmt;

/// A torrent as returned by the list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Torrent {
    /// Info-hash, upper-case hex as rTorrent reports it
    pub hash: String,
    /// Display name
    pub name: String,
    /// Whether the download has finished
    pub completed: bool,
    /// Total size in bytes
    pub size_bytes: u64,
    /// Upload ratio in per-mille (1000 == 1.0)
    pub ratio: i64,
    /// Label (`d.custom1`)
    pub label: String,
    /// Download location on the daemon host
    pub base_path: String,
}

impl Torrent {
    /// Create a torrent with only identity and completion set.
    pub fn new(hash: impl Into<String>, name: impl Into<String>, completed: bool) -> Self {
        Self {
            hash: hash.into(),
            name: name.into(),
            completed,
            size_bytes: 0,
            ratio: 0,
            label: String::new(),
            base_path: String::new(),
        }
    }
}

impl fmt::Display for Torrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.hash)
    }
}

/// Daemon-side torrent state (`d.state`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorrentState {
    /// Closed: the ratio group (or a user) released the torrent
    Stopped,
    /// Started: still seeding under the daemon's criteria
    Started,
    /// Any value the daemon is not documented to return
    Other(i64),
}

impl TorrentState {
    /// Map the raw `d.state` integer.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => TorrentState::Stopped,
            1 => TorrentState::Started,
            other => TorrentState::Other(other),
        }
    }

    /// Whether the daemon is still holding the torrent open for seeding.
    pub fn is_seeding(&self) -> bool {
        matches!(self, TorrentState::Started)
    }
}

/// Transfer snapshot for a single torrent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TorrentStatus {
    pub completed: bool,
    pub completed_bytes: u64,
    pub size_bytes: u64,
    /// Download rate in bytes/sec
    pub down_rate: u64,
    /// Upload rate in bytes/sec
    pub up_rate: u64,
    /// Upload ratio in per-mille
    pub ratio: i64,
}

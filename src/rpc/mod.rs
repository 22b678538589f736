//! RPC capability used by the sweep, and its rTorrent XML-RPC adapter.

mod client;
pub mod xmlrpc;

pub use client::{RtorrentClient, DEFAULT_VIEW};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::torrent::{Torrent, TorrentState, TorrentStatus};

/// Operations the sweep needs from a torrent daemon.
///
/// This trait lets the orchestrator run against the real XML-RPC adapter or
/// an in-memory fake.
#[async_trait]
pub trait TorrentRpc: Send + Sync {
    /// List the torrents in a view, in daemon order.
    ///
    /// The outer error fails the whole listing. An inner error marks a single
    /// row that could not be decoded.
    async fn list_torrents(&self, view: &str) -> Result<Vec<Result<Torrent>>>;

    /// Fetch the open/closed state.
    async fn state(&self, torrent: &Torrent) -> Result<TorrentState>;

    /// Fetch when the state last changed.
    async fn state_changed(&self, torrent: &Torrent) -> Result<DateTime<Utc>>;

    /// Fetch completion and transfer rates.
    async fn status(&self, torrent: &Torrent) -> Result<TorrentStatus>;

    /// Remove the torrent from the daemon.
    async fn delete(&self, torrent: &Torrent) -> Result<()>;
}

//! rtorrent-reaper - Idle Torrent Cleanup for rTorrent
//!
//! Lists the torrents of an rTorrent daemon over XML-RPC, decides for each one
//! whether it is finished and idle long enough to remove, and erases those that
//! qualify. Every request to the daemon passes through a sliding-window
//! throttle so a sweep never floods it.

pub mod cli;
pub mod config;
pub mod duration;
pub mod error;
pub mod logging;
pub mod ratelimit;
pub mod rpc;
pub mod sweep;
pub mod torrent;

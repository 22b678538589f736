//! Error types for rtorrent-reaper.

use thiserror::Error;

/// Main error type for reaper operations.
#[derive(Error, Debug)]
pub enum ReaperError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level HTTP failures (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The daemon answered with a non-success HTTP status
    #[error("Daemon returned HTTP status {status}")]
    Status { status: u16 },

    /// The daemon answered with an XML-RPC fault
    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: i64, message: String },

    /// The response body was not well-formed XML
    #[error("Malformed XML-RPC payload: {0}")]
    Xml(String),

    /// The response was well-formed but not shaped as expected
    #[error("Unexpected XML-RPC response: {0}")]
    UnexpectedResponse(String),

    /// The run was cancelled while waiting on the daemon
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<quick_xml::Error> for ReaperError {
    fn from(err: quick_xml::Error) -> Self {
        ReaperError::Xml(err.to_string())
    }
}

impl From<config::ConfigError> for ReaperError {
    fn from(err: config::ConfigError) -> Self {
        ReaperError::Config(err.to_string())
    }
}

/// Result type alias for reaper operations.
pub type Result<T> = std::result::Result<T, ReaperError>;

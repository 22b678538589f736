//! Outbound request throttling.

mod bucket;
mod transport;

pub use bucket::{RequestBucket, DEFAULT_CAPACITY, DEFAULT_PERIOD};
pub use transport::{HttpTransport, Throttled, Transport, DEFAULT_TIMEOUT};

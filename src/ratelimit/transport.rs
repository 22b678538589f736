//! Request executors and the throttling decorator placed in front of them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request, Response};
use tracing::trace;

use super::bucket::RequestBucket;
use crate::error::Result;

/// Default per-request timeout for daemon calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for anything that can execute an HTTP request.
///
/// The RPC adapter talks to the daemon only through this trait, which lets
/// the throttle wrap the real HTTP client transparently.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a single request and return the raw response.
    async fn execute(&self, request: Request) -> Result<Response>;
}

/// Transport backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        Ok(self.client.execute(request).await?)
    }
}

/// Decorator that admits requests through a [`RequestBucket`] before
/// forwarding them, unchanged, to the wrapped transport.
pub struct Throttled<T> {
    /// The wrapped transport
    inner: T,
    /// Shared admission bucket
    bucket: Arc<RequestBucket>,
}

impl<T: Transport> Throttled<T> {
    /// Wrap `inner`, admitting at most `capacity` requests per `period`.
    pub fn new(inner: T, capacity: u32, period: Duration) -> Self {
        Self::with_bucket(inner, Arc::new(RequestBucket::new(capacity, period)))
    }

    /// Wrap `inner` with an existing bucket, shared with other transports.
    pub fn with_bucket(inner: T, bucket: Arc<RequestBucket>) -> Self {
        Self { inner, bucket }
    }

    /// Get the bucket gating this transport.
    pub fn bucket(&self) -> &Arc<RequestBucket> {
        &self.bucket
    }

    /// Get the wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for Throttled<T> {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.bucket.acquire().await;
        trace!(url = %request.url(), "Request admitted");
        self.inner.execute(request).await
    }
}

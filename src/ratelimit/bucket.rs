//! Request admission bucket.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Default number of requests admitted per period.
pub const DEFAULT_CAPACITY: u32 = 1;
/// Default refill period.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// Admits at most `capacity` requests in any window of length `period`.
///
/// Admissions are kept in a short log rather than a per-window counter, so a
/// burst straddling a window boundary cannot exceed the capacity. The bucket
/// is thread-safe and can be shared across tasks.
pub struct RequestBucket {
    /// Maximum admissions per period
    capacity: u32,
    /// Length of the sliding window
    period: Duration,
    /// Instants of the most recent admissions, oldest first
    admitted: Mutex<VecDeque<Instant>>,
}

impl RequestBucket {
    /// Create a new bucket. A zero capacity is raised to one.
    pub fn new(capacity: u32, period: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            period,
            admitted: Mutex::new(VecDeque::with_capacity(capacity as usize)),
        }
    }

    /// Get the capacity of this bucket.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Get the window length of this bucket.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait until a request may be admitted, then record the admission.
    ///
    /// Never fails. Dropping the returned future before it resolves leaves
    /// the bucket untouched.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut admitted = self.admitted.lock();
                // Read the clock under the lock so the log stays in admission order
                match self.admit(&mut admitted, Instant::now()) {
                    None => return,
                    Some(wait) => wait,
                }
            };

            trace!(
                wait_ms = wait.as_millis() as u64,
                capacity = self.capacity,
                "Waiting for request slot"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Admit at `now` if a slot is free.
    ///
    /// Returns `None` on admission, otherwise how long until the oldest
    /// admission leaves the window.
    pub fn try_admit(&self, now: Instant) -> Option<Duration> {
        self.admit(&mut self.admitted.lock(), now)
    }

    fn admit(&self, admitted: &mut VecDeque<Instant>, now: Instant) -> Option<Duration> {
        while let Some(&oldest) = admitted.front() {
            if now.saturating_duration_since(oldest) >= self.period {
                admitted.pop_front();
            } else {
                break;
            }
        }

        if admitted.len() < self.capacity as usize {
            admitted.push_back(now);
            return None;
        }

        admitted
            .front()
            .map(|&oldest| (oldest + self.period).saturating_duration_since(now))
    }
}

impl Default for RequestBucket {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_PERIOD)
    }
}

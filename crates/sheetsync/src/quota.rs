//! Client-side request throttling.
//!
//! Google Sheets limits how many read and write requests a user may issue per
//! 100 seconds. Rather than waiting for the service to reject a request, each
//! [`SheetsClient`](crate::SheetsClient) records its requests in two sliding
//! windows and pauses the caller once a window is full.
//!
//! The limiter is best-effort: it is not persisted and not shared between
//! processes.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::Instant};
use tracing::warn;

/// Default number of requests allowed per window, for reads and writes each.
pub const DEFAULT_QUOTA: usize = 50;

/// Default length of the sliding window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(100);

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A time-ordered queue of request timestamps bounded by a quota.
#[derive(Debug)]
pub struct SlidingWindow {
    name: &'static str,
    quota: usize,
    window: Duration,
    stamps: VecDeque<Instant>,
}

impl SlidingWindow {
    /// Creates an empty window. A quota of zero is treated as one.
    pub fn new(name: &'static str, quota: usize, window: Duration) -> Self {
        Self {
            name,
            quota: quota.max(1),
            window,
            stamps: VecDeque::new(),
        }
    }

    /// Number of requests currently inside the window.
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Records a request, waiting in one-second steps while the window is
    /// already full.
    ///
    /// The request is stamped when it is released, so a throttled request
    /// counts against the window from the moment it actually goes out.
    /// Returns how long the caller was held back.
    pub async fn acquire(&mut self) -> Duration {
        let start = Instant::now();
        self.evict(start);

        if self.stamps.len() >= self.quota {
            warn!(
                kind = self.name,
                quota = self.quota,
                window_secs = self.window.as_secs(),
                "request quota reached, throttling"
            );
        }
        while self.stamps.len() >= self.quota {
            tokio::time::sleep(POLL_INTERVAL).await;
            self.evict(Instant::now());
        }

        let released = Instant::now();
        self.stamps.push_back(released);
        released.duration_since(start)
    }

    fn evict(&mut self, now: Instant) {
        while let Some(front) = self.stamps.front()
            && now.duration_since(*front) > self.window
        {
            self.stamps.pop_front();
        }
    }
}

/// Independent read and write windows shared by every clone of a client.
#[derive(Debug, Clone)]
pub struct QuotaLimiter {
    reads: Arc<Mutex<SlidingWindow>>,
    writes: Arc<Mutex<SlidingWindow>>,
}

impl QuotaLimiter {
    pub fn new(read_quota: usize, write_quota: usize, window: Duration) -> Self {
        Self {
            reads: Arc::new(Mutex::new(SlidingWindow::new("read", read_quota, window))),
            writes: Arc::new(Mutex::new(SlidingWindow::new(
                "write",
                write_quota,
                window,
            ))),
        }
    }

    /// Records a read request, blocking while the read quota is exhausted.
    pub async fn read(&self) -> Duration {
        self.reads.lock().await.acquire().await
    }

    /// Records a write request, blocking while the write quota is exhausted.
    pub async fn write(&self) -> Duration {
        self.writes.lock().await.acquire().await
    }

    /// Number of `(reads, writes)` currently counted in their windows.
    pub async fn in_flight(&self) -> (usize, usize) {
        (self.reads.lock().await.len(), self.writes.lock().await.len())
    }
}

impl Default for QuotaLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA, DEFAULT_QUOTA, DEFAULT_WINDOW)
    }
}

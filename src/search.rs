//! Debounced, latest-request-wins search submission.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Single-slot search coordinator. Every submission takes a monotonically
/// increasing ticket; a submission is abandoned once a newer ticket exists,
/// both during the debounce delay and after the fetch returns, so a slow
/// stale response can never overwrite fresher results.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    seq: Arc<AtomicU64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, seq: Arc::new(AtomicU64::new(0)) }
    }

    /// Waits out the debounce delay, then runs `fetch`. Returns `None` if the
    /// submission was superseded at any point; the in-flight fetch itself is
    /// not cancelled, only its result discarded.
    pub async fn submit<F, Fut, T>(&self, fetch: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.delay).await;
        if self.seq.load(Ordering::SeqCst) != ticket {
            return None;
        }

        let out = fetch().await;
        if self.seq.load(Ordering::SeqCst) != ticket {
            return None;
        }
        Some(out)
    }
}

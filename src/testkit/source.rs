//! Mock [`RateSource`] with scripted fetch results.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::Rate;
use crate::error::FetchError;
use crate::port::RateSource;

/// A mock source with a queue of fetch results.
///
/// Each `fetch()` pops the next result; an exhausted queue yields
/// [`FetchError::NoData`]. An optional per-fetch delay makes concurrency
/// tests (single-flight refresh) deterministic.
pub struct ScriptedSource {
    results: Mutex<VecDeque<Result<Vec<Rate>, FetchError>>>,
    fetch_count: Arc<AtomicU32>,
    delay: Option<Duration>,
}

impl ScriptedSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            fetch_count: Arc::new(AtomicU32::new(0)),
            delay: None,
        }
    }

    #[must_use]
    pub fn with_results(self, results: Vec<Result<Vec<Rate>, FetchError>>) -> Self {
        *self.results.lock() = results.into();
        self
    }

    /// Delay each fetch, to widen race windows in concurrency tests.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared counter for asserting fetch call counts.
    #[must_use]
    pub fn counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.fetch_count)
    }

    #[must_use]
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateSource for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<Rate>, FetchError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.results
            .lock()
            .pop_front()
            .unwrap_or(Err(FetchError::NoData))
    }
}

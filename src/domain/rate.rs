//! Rate records and atomically-fetched snapshots.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::Pair;

/// One currency-pair quote. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rate {
    pub pair: Pair,
    pub buy: Decimal,
    pub sell: Decimal,
    /// When the upstream observed this quote, as reported by the API.
    pub observed_at: DateTime<Utc>,
}

/// One atomically-fetched, timestamped collection of rate records.
///
/// All records in a snapshot come from a single fetch and share one
/// `fetched_at`. After filtering, a snapshot holds at most one record per
/// currency pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub rates: Vec<Rate>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    #[must_use]
    pub fn new(rates: Vec<Rate>, fetched_at: DateTime<Utc>) -> Self {
        Self { rates, fetched_at }
    }

    /// The record for a pair, if present.
    #[must_use]
    pub fn rate_for(&self, pair: Pair) -> Option<&Rate> {
        self.rates.iter().find(|r| r.pair == pair)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Wall-clock age of this snapshot, saturating at zero.
    #[must_use]
    pub fn age(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.fetched_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Whether this snapshot may still be served without refetching.
    #[must_use]
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

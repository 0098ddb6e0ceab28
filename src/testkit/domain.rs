//! Builders for domain primitives used across tests.

use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{CurrencyCode, Pair, Rate, Snapshot, SubscriberId};

#[must_use]
pub fn usd_uah() -> Pair {
    Pair::new(CurrencyCode::USD, CurrencyCode::UAH)
}

#[must_use]
pub fn eur_uah() -> Pair {
    Pair::new(CurrencyCode::EUR, CurrencyCode::UAH)
}

#[must_use]
pub fn subscriber(id: i64) -> SubscriberId {
    SubscriberId::new(id)
}

#[must_use]
pub fn rate(pair: Pair, buy: Decimal, sell: Decimal) -> Rate {
    Rate {
        pair,
        buy,
        sell,
        observed_at: Utc::now(),
    }
}

/// A canonical USD/UAH rate.
#[must_use]
pub fn usd_uah_rate() -> Rate {
    rate(usd_uah(), dec!(40.0), dec!(40.5))
}

/// A canonical EUR/UAH rate.
#[must_use]
pub fn eur_uah_rate() -> Rate {
    rate(eur_uah(), dec!(43.0), dec!(43.5))
}

/// A snapshot fetched right now.
#[must_use]
pub fn snapshot(rates: Vec<Rate>) -> Snapshot {
    Snapshot::new(rates, Utc::now())
}

/// A snapshot fetched `age` ago.
#[must_use]
pub fn snapshot_aged(rates: Vec<Rate>, age: Duration) -> Snapshot {
    let age = chrono::Duration::from_std(age).unwrap_or_else(|_| chrono::Duration::zero());
    Snapshot::new(rates, Utc::now() - age)
}

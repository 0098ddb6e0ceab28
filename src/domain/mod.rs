//! Domain types: currency pairs, rate records, snapshots, and change detection.

pub mod currency;
pub mod diff;
pub mod id;
pub mod rate;

pub use currency::{CurrencyCode, Pair};
pub use diff::snapshot_changed;
pub use id::{Scope, SubscriberId};
pub use rate::{Rate, Snapshot};

use thiserror::Error;

/// Errors from parsing or validating domain primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("invalid pair '{0}': expected BASE/QUOTE")]
    InvalidPair(String),
}

use thiserror::Error;

use crate::domain::{DomainError, SubscriberId};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors produced by a [`RateSource`](crate::port::RateSource) fetch.
///
/// The variants map onto distinct retry policies: [`RateLimited`](Self::RateLimited)
/// gets a single delayed retry within the same cycle, everything else waits
/// for the next scheduled tick.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("rate limited by upstream")]
    RateLimited,

    #[error("upstream returned status {status}")]
    Upstream { status: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("fetch returned no usable rates")]
    NoData,
}

impl FetchError {
    /// Whether this failure is worth retrying within the same polling cycle.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Errors produced by a [`Sink`](crate::port::Sink) delivery.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("delivery to {recipient} failed: {reason}")]
    Delivery {
        recipient: SubscriberId,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

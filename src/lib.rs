//! Ratewatch - currency exchange rate watching and change notification.
//!
//! This crate polls an upstream bank API for currency exchange rates on a
//! fixed interval, caches the latest snapshot per cache scope, detects
//! material rate changes, and pushes notifications to subscribers.
//!
//! # Architecture
//!
//! The core is transport-agnostic and talks to the outside world through two
//! ports:
//!
//! - [`port::RateSource`] - fetches raw rate records from an upstream API
//! - [`port::Sink`] - delivers a rendered notification to one recipient
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files with env overrides
//! - [`domain`] - Currency pairs, rate records, snapshots, change detection
//! - [`error`] - Error types for the crate
//! - [`cache`] - TTL-based snapshot cache with single-flight refresh
//! - [`registry`] - Subscriber registry
//! - [`router`] - Fan-out of changed snapshots to subscribers
//! - [`poller`] - Periodic fetch-compare-store-notify cycle
//! - [`adapter`] - Upstream (Monobank) and Telegram adapters
//! - [`app`] - Application wiring and command handling
//!
//! # Features
//!
//! - `telegram` - Enable the Telegram sink and command listener (default)
//! - `testkit` - Expose shared mock implementations to integration tests
//!
//! # Example
//!
//! ```no_run
//! use ratewatch::cache::RateCache;
//! use ratewatch::domain::SubscriberId;
//! use ratewatch::registry::SubscriptionRegistry;
//!
//! let cache = RateCache::new();
//! let registry = SubscriptionRegistry::new();
//! registry.add(SubscriberId::new(1));
//! ```

pub mod adapter;
pub mod app;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod poller;
pub mod port;
pub mod registry;
pub mod router;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use error::{Error, Result};

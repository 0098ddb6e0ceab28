//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`source`] — [`ScriptedSource`](source::ScriptedSource), a mock
//!   [`RateSource`](crate::port::RateSource) with queued fetch results.
//! - [`sink`] — [`RecordingSink`](sink::RecordingSink), a mock
//!   [`Sink`](crate::port::Sink) that records deliveries.
//! - [`domain`] — Builders for domain primitives: pairs, rates, snapshots.

pub mod domain;
pub mod sink;
pub mod source;

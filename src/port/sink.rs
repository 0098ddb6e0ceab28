//! Notification sink port.

use async_trait::async_trait;
use tracing::info;

use crate::domain::SubscriberId;
use crate::error::SinkError;

/// Delivers a rendered notification to one recipient.
///
/// Implementations must be safe to call concurrently. Delivery is
/// at-most-once; the caller treats a returned error as a failed delivery
/// for that recipient only.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn deliver(&self, recipient: SubscriberId, text: &str) -> Result<(), SinkError>;
}

/// A sink that logs deliveries via tracing.
///
/// Used when no real transport is configured, and as a stand-in in builds
/// without the `telegram` feature.
pub struct LogSink;

#[async_trait]
impl Sink for LogSink {
    async fn deliver(&self, recipient: SubscriberId, text: &str) -> Result<(), SinkError> {
        info!(recipient = %recipient, chars = text.len(), "notification delivered to log");
        Ok(())
    }
}

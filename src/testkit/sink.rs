//! Mock [`Sink`] that records deliveries.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::SubscriberId;
use crate::error::SinkError;
use crate::port::Sink;

/// A mock sink recording every delivery attempt.
///
/// Recipients listed as failing get a [`SinkError`] while still being
/// recorded as attempts, which is what per-recipient isolation tests need.
#[derive(Default)]
pub struct RecordingSink {
    attempts: Mutex<Vec<SubscriberId>>,
    deliveries: Mutex<Vec<(SubscriberId, String)>>,
    failing: Mutex<HashSet<SubscriberId>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_failures(self, recipients: Vec<SubscriberId>) -> Self {
        *self.failing.lock() = recipients.into_iter().collect();
        self
    }

    /// Every recipient a delivery was attempted for, in order.
    #[must_use]
    pub fn attempts(&self) -> Vec<SubscriberId> {
        self.attempts.lock().clone()
    }

    /// Successful deliveries with their rendered text, in order.
    #[must_use]
    pub fn deliveries(&self) -> Vec<(SubscriberId, String)> {
        self.deliveries.lock().clone()
    }

    #[must_use]
    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().len()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    async fn deliver(&self, recipient: SubscriberId, text: &str) -> Result<(), SinkError> {
        self.attempts.lock().push(recipient);

        if self.failing.lock().contains(&recipient) {
            return Err(SinkError::Delivery {
                recipient,
                reason: "scripted failure".into(),
            });
        }

        self.deliveries.lock().push((recipient, text.to_string()));
        Ok(())
    }
}

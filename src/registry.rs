//! Subscriber registry.

use std::collections::BTreeSet;

use parking_lot::RwLock;

use crate::domain::SubscriberId;

/// The set of recipients currently interested in change notifications.
///
/// Append-mostly: subscribers are added on their first `/start` and there is
/// no command that removes them. [`remove`](Self::remove) exists so a pruning
/// policy can be wired in once there is a product decision on unsubscribe.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscribers: RwLock<BTreeSet<SubscriberId>>,
}

impl SubscriptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent set-insert. Returns whether the subscriber was new.
    pub fn add(&self, id: SubscriberId) -> bool {
        self.subscribers.write().insert(id)
    }

    /// Remove a subscriber. Returns whether it was present.
    ///
    /// Currently uncalled; kept available for a future unsubscribe or
    /// dead-recipient pruning policy.
    pub fn remove(&self, id: SubscriberId) -> bool {
        self.subscribers.write().remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.read().contains(&id)
    }

    /// All current subscribers, in stable order.
    #[must_use]
    pub fn list(&self) -> Vec<SubscriberId> {
        self.subscribers.read().iter().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }
}

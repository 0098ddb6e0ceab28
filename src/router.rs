//! Fan-out of changed snapshots to the current subscriber set.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{Scope, Snapshot, SubscriberId};
use crate::error::SinkError;
use crate::port::Sink;
use crate::registry::SubscriptionRegistry;

/// Renders a snapshot into the text delivered to recipients.
pub type Renderer = Arc<dyn Fn(&Snapshot) -> String + Send + Sync>;

/// Resolves the recipient set for a scope and delivers a rendered snapshot
/// to each recipient through the [`Sink`].
pub struct NotificationRouter {
    registry: Arc<SubscriptionRegistry>,
    sink: Arc<dyn Sink>,
    render: Renderer,
}

impl NotificationRouter {
    #[must_use]
    pub fn new(registry: Arc<SubscriptionRegistry>, sink: Arc<dyn Sink>, render: Renderer) -> Self {
        Self {
            registry,
            sink,
            render,
        }
    }

    /// Deliver `snapshot` to every recipient of `scope`.
    ///
    /// A failed delivery to one recipient never aborts delivery to the
    /// rest; failures are logged and returned to the caller, which is
    /// expected to log them too rather than escalate.
    pub async fn notify(
        &self,
        scope: Scope,
        snapshot: &Snapshot,
    ) -> Vec<(SubscriberId, SinkError)> {
        let recipients = self.recipients_for(scope);
        if recipients.is_empty() {
            debug!(scope = %scope, "no recipients for scope, skipping notification");
            return Vec::new();
        }

        let text = (self.render)(snapshot);
        let total = recipients.len();
        let mut failures = Vec::new();

        for recipient in recipients {
            if let Err(error) = self.sink.deliver(recipient, &text).await {
                warn!(recipient = %recipient, error = %error, "notification delivery failed");
                failures.push((recipient, error));
            }
        }

        if !failures.is_empty() {
            warn!(
                scope = %scope,
                delivered = total - failures.len(),
                failed = failures.len(),
                "some notification deliveries failed"
            );
        }

        failures
    }

    /// The recipients interested in a scope.
    ///
    /// The global scope fans out to every subscriber; a subscriber scope
    /// targets that subscriber alone, and only while it is registered.
    fn recipients_for(&self, scope: Scope) -> Vec<SubscriberId> {
        match scope {
            Scope::Global => self.registry.list(),
            Scope::Subscriber(id) => {
                if self.registry.contains(id) {
                    vec![id]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

use std::sync::Arc;

use deckbridge_core::events::TriggerEvent;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::subscriber::SubscriberRegistry;

/// Outcome of enqueueing one event onto one subscriber channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The subscriber's pending queue was full.
    QueueFull,
    /// The channel was torn down concurrently.
    Gone,
}

/// Fans one event out to every currently registered subscriber channel.
pub struct Broadcaster {
    registry: Arc<SubscriberRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `event` to every subscriber in the current snapshot.
    ///
    /// Best-effort: a member that cannot accept the event never stops
    /// delivery to the rest. Members whose enqueue fails are pruned through
    /// the normal unregister path; a full queue or a closed channel means
    /// the connection is dead. Returns the number of successful deliveries.
    /// Zero subscribers is a silent no-op.
    pub fn broadcast(&self, event: TriggerEvent) -> usize {
        let members = self.registry.snapshot();
        let mut delivered = 0;
        let mut dead = Vec::new();

        for (id, tx) in members {
            match enqueue(&tx, event.clone()) {
                Delivery::Delivered => delivered += 1,
                Delivery::QueueFull => {
                    tracing::warn!(subscriber_id = %id, "Pending queue full, pruning subscriber");
                    dead.push(id);
                }
                Delivery::Gone => dead.push(id),
            }
        }

        for id in dead {
            self.registry.unregister(&id);
        }

        delivered
    }
}

/// Non-blocking enqueue with an explicit per-call outcome.
fn enqueue(tx: &mpsc::Sender<TriggerEvent>, event: TriggerEvent) -> Delivery {
    match tx.try_send(event) {
        Ok(()) => Delivery::Delivered,
        Err(TrySendError::Full(_)) => Delivery::QueueFull,
        Err(TrySendError::Closed(_)) => Delivery::Gone,
    }
}

use dashmap::DashMap;
use deckbridge_core::events::TriggerEvent;
use deckbridge_core::ids::SubscriberId;
use tokio::sync::mpsc;

/// One registered subscriber as seen by the registry: the sender half of its
/// pending-event queue. The receiver half is owned by the stream handler
/// serving that connection and is never shared.
pub struct Subscriber {
    pub id: SubscriberId,
    pub tx: mpsc::Sender<TriggerEvent>,
}

/// Concurrency-safe set of active subscriber channels.
///
/// This is the only state shared across connections. It is explicitly owned
/// and injected (there is no process-wide instance); its lifetime is the
/// server's, starting empty.
pub struct SubscriberRegistry {
    subscribers: DashMap<SubscriberId, Subscriber>,
    max_pending_events: usize,
}

impl SubscriberRegistry {
    /// `max_pending_events` is the per-subscriber queue capacity; events
    /// beyond it are dropped at broadcast time rather than blocking.
    pub fn new(max_pending_events: usize) -> Self {
        Self {
            subscribers: DashMap::new(),
            max_pending_events,
        }
    }

    /// Create a new subscriber channel and add it to the set. Returns the id
    /// and the receiver half for the owning connection.
    pub fn register(&self) -> (SubscriberId, mpsc::Receiver<TriggerEvent>) {
        let id = SubscriberId::new();
        let (tx, rx) = mpsc::channel(self.max_pending_events);
        self.subscribers.insert(
            id.clone(),
            Subscriber {
                id: id.clone(),
                tx,
            },
        );
        tracing::debug!(subscriber_id = %id, "Subscriber registered");
        (id, rx)
    }

    /// Remove a subscriber. Removing one that is already gone is a no-op.
    /// Dropping the registry's sender closes the channel, which ends the
    /// owning stream once its pending events are drained.
    pub fn unregister(&self, id: &SubscriberId) {
        if self.subscribers.remove(id).is_some() {
            tracing::debug!(subscriber_id = %id, "Subscriber unregistered");
        }
    }

    /// Point-in-time copy of the current members. Delivery runs against the
    /// copy, so a slow enqueue never holds up register/unregister.
    pub fn snapshot(&self) -> Vec<(SubscriberId, mpsc::Sender<TriggerEvent>)> {
        self.subscribers
            .iter()
            .map(|entry| (entry.id.clone(), entry.tx.clone()))
            .collect()
    }

    /// Number of active subscribers.
    pub fn count(&self) -> usize {
        self.subscribers.len()
    }
}

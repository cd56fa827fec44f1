//! Mission event delivery
//!
//! Handlers subscribe explicitly when a mission starts and receive their
//! events over a private channel. The returned [`Subscription`] is a scoped
//! guard: dropping it unregisters the handler, whichever path the mission
//! takes to its end. Queues are drained synchronously on the tick thread;
//! nothing here awaits or spawns.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::ItemStack;

/// Kinds of events a handler can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The agent completed a discrete movement step
    DiscreteMove,
    /// Items came out of a furnace
    ItemSmelted,
}

/// Notification published by the host
#[derive(Debug, Clone, PartialEq)]
pub enum MissionEvent {
    /// Evaluate now; carries no payload
    DiscreteMove,
    /// A stack of items was smelted
    ItemSmelted(ItemStack),
}

impl MissionEvent {
    /// Kind used for subscription filtering
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DiscreteMove => EventKind::DiscreteMove,
            Self::ItemSmelted(_) => EventKind::ItemSmelted,
        }
    }
}

struct Subscriber {
    kinds: Vec<EventKind>,
    sender: UnboundedSender<MissionEvent>,
}

/// Cloneable handle to a set of subscribers
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<HashMap<Uuid, Subscriber>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventBus {
    /// Create a bus with no subscribers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Subscriber>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register interest in the given event kinds
    #[must_use]
    pub fn subscribe(&self, kinds: &[EventKind]) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.lock().insert(
            id,
            Subscriber {
                kinds: kinds.to_vec(),
                sender,
            },
        );
        debug!(%id, ?kinds, "subscribed");
        Subscription {
            id,
            bus: self.clone(),
            receiver,
        }
    }

    /// Deliver an event to every interested subscriber, returning how many
    /// received it
    pub fn publish(&self, event: MissionEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        let mut closed = Vec::new();
        let mut subscribers = self.lock();
        for (id, subscriber) in subscribers.iter() {
            if !subscriber.kinds.contains(&kind) {
                continue;
            }
            if subscriber.sender.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                closed.push(*id);
            }
        }
        for id in closed {
            subscribers.remove(&id);
        }
        trace!(?kind, delivered, "published");
        delivered
    }

    /// Number of live subscriptions
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn unsubscribe(&self, id: Uuid) {
        if self.lock().remove(&id).is_some() {
            debug!(%id, "unsubscribed");
        }
    }
}

/// Scoped registration on an [`EventBus`]
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    bus: EventBus,
    receiver: UnboundedReceiver<MissionEvent>,
}

impl Subscription {
    /// Next pending event, if any
    pub fn try_next(&mut self) -> Option<MissionEvent> {
        self.receiver.try_recv().ok()
    }

    /// Take every pending event in delivery order
    pub fn drain(&mut self) -> Vec<MissionEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

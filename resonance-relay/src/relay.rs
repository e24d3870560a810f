//! Per-user message queues.
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::envelope::Envelope;
use crate::queue::BoundedQueue;

/// Default number of messages kept per user.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Routes envelopes to per-user queues.
///
/// Queues are dropped on [`unsubscribe`](Relay::unsubscribe) and emptied on
/// [`drain`](Relay::drain). Nothing is persisted.
#[derive(Debug)]
pub struct Relay {
    queues: FxHashMap<String, BoundedQueue<Envelope>>,
    capacity: usize,
}

impl Default for Relay {
    fn default() -> Relay {
        Relay::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl Relay {
    /// Create a relay keeping at most `capacity` messages per user.
    pub fn new(capacity: usize) -> Relay {
        Relay {
            queues: FxHashMap::default(),
            capacity,
        }
    }

    /// Create the queue of a user if it does not exist yet.
    pub fn subscribe(&mut self, user: &str) {
        let capacity = self.capacity;
        self.queues.entry(user.to_owned()).or_insert_with(|| {
            debug!("subscribed {}", user);
            BoundedQueue::new(capacity)
        });
    }

    /// Drop the queue of a user with all pending messages.
    ///
    /// Returns whether the user was subscribed.
    pub fn unsubscribe(&mut self, user: &str) -> bool {
        let removed = self.queues.remove(user).is_some();
        if removed {
            debug!("unsubscribed {}", user);
        }
        removed
    }

    pub fn is_subscribed(&self, user: &str) -> bool {
        self.queues.contains_key(user)
    }

    /// Number of subscribed users.
    pub fn subscriber_count(&self) -> usize {
        self.queues.len()
    }

    /// Queue a message for a user, subscribing the user if necessary.
    ///
    /// Returns the oldest message of the queue if it was dropped to make room.
    pub fn publish(&mut self, user: &str, envelope: Envelope) -> Option<Envelope> {
        self.subscribe(user);
        let dropped = self.queues.get_mut(user)?.push(envelope);
        if let Some(dropped) = &dropped {
            warn!("queue of {} is full, dropped a {} message", user, dropped.kind);
        }
        dropped
    }

    /// Queue a message for every subscribed user.
    ///
    /// Returns the number of users reached.
    pub fn broadcast(&mut self, envelope: &Envelope) -> usize {
        for (user, queue) in self.queues.iter_mut() {
            if let Some(dropped) = queue.push(envelope.clone()) {
                warn!("queue of {} is full, dropped a {} message", user, dropped.kind);
            }
        }
        self.queues.len()
    }

    /// Remove and return all pending messages of a user.
    pub fn drain(&mut self, user: &str) -> Vec<Envelope> {
        match self.queues.get_mut(user) {
            Some(queue) => queue.drain(),
            None => vec![],
        }
    }

    /// Number of pending messages of a user.
    pub fn pending(&self, user: &str) -> usize {
        self.queues.get(user).map_or(0, |queue| queue.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn message(index: usize) -> Envelope {
        Envelope::new("progress", json!({ "iteration": index }))
    }

    #[test]
    fn routes_to_users() {
        let mut relay = Relay::default();
        relay.subscribe("alice");
        relay.subscribe("bob");

        relay.publish("alice", message(1));
        assert_eq!(relay.broadcast(&message(2)), 2);

        assert_eq!(relay.drain("alice"), vec![message(1), message(2)]);
        assert_eq!(relay.drain("bob"), vec![message(2)]);
        assert!(relay.drain("alice").is_empty());
        assert!(relay.drain("carol").is_empty());
    }

    #[test]
    fn publish_subscribes() {
        let mut relay = Relay::default();
        assert!(!relay.is_subscribed("alice"));
        relay.publish("alice", message(0));
        assert!(relay.is_subscribed("alice"));
        assert_eq!(relay.pending("alice"), 1);

        assert!(relay.unsubscribe("alice"));
        assert!(!relay.unsubscribe("alice"));
        assert_eq!(relay.pending("alice"), 0);
        assert_eq!(relay.subscriber_count(), 0);
    }

    #[test]
    fn capped_queues() {
        let mut relay = Relay::new(3);
        for index in 0..3 {
            assert_eq!(relay.publish("alice", message(index)), None);
        }
        assert_eq!(relay.publish("alice", message(3)), Some(message(0)));
        assert_eq!(relay.drain("alice"), (1..4).map(message).collect::<Vec<_>>());
    }

    #[test]
    fn default_capacity() {
        let mut relay = Relay::default();
        for index in 0..DEFAULT_QUEUE_CAPACITY + 5 {
            relay.publish("alice", message(index));
        }
        let pending = relay.drain("alice");
        assert_eq!(pending.len(), DEFAULT_QUEUE_CAPACITY);
        assert_eq!(pending[0], message(5));
    }
}

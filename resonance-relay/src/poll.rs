//! Long polling fallback for clients without event streams.
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::queue::BoundedQueue;
use crate::relay::DEFAULT_QUEUE_CAPACITY;

/// Messages older than this are pruned on every poll and push.
pub const RETENTION_MS: u64 = 5 * 60 * 1000;

/// Body of a poll request.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollRequest {
    pub user_id: String,
    /// Time of the newest message the client has seen, `0` for all.
    #[serde(default)]
    pub last_message_time: u64,
}

/// A buffered message with the time it was posted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimedMessage {
    pub time: u64,
    #[serde(flatten)]
    pub envelope: Envelope,
}

/// Body of a poll response.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub messages: Vec<TimedMessage>,
    /// Time to pass as `lastMessageTime` on the next poll.
    pub last_message_time: u64,
}

/// Timestamped per-user message buffers.
///
/// Unlike the relay queues, polling does not remove messages. They stay until they are older
/// than [`RETENTION_MS`] or pushed out by newer ones.
#[derive(Debug)]
pub struct PollBuffer {
    buffers: FxHashMap<String, BoundedQueue<TimedMessage>>,
    capacity: usize,
}

impl Default for PollBuffer {
    fn default() -> PollBuffer {
        PollBuffer::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl PollBuffer {
    pub fn new(capacity: usize) -> PollBuffer {
        PollBuffer {
            buffers: FxHashMap::default(),
            capacity,
        }
    }

    /// Drop messages older than the retention period and users left without messages.
    ///
    /// Returns the number of users removed.
    pub fn prune(&mut self, now: u64) -> usize {
        let cutoff = now.saturating_sub(RETENTION_MS);
        let before = self.buffers.len();
        self.buffers.retain(|_, buffer| {
            buffer.retain(|message| message.time >= cutoff);
            !buffer.is_empty()
        });
        before - self.buffers.len()
    }

    /// Buffer a message for a user, pruning expired messages of all users.
    pub fn push(&mut self, user: &str, envelope: Envelope, now: u64) {
        self.prune(now);
        let capacity = self.capacity;
        self.buffers
            .entry(user.to_owned())
            .or_insert_with(|| BoundedQueue::new(capacity))
            .push(TimedMessage {
                time: now,
                envelope,
            });
    }

    /// Buffer a message for every user with unexpired messages.
    ///
    /// Returns the number of users reached.
    pub fn broadcast(&mut self, envelope: &Envelope, now: u64) -> usize {
        self.prune(now);
        for buffer in self.buffers.values_mut() {
            buffer.push(TimedMessage {
                time: now,
                envelope: envelope.clone(),
            });
        }
        self.buffers.len()
    }

    /// Messages of `user` newer than `last_message_time`.
    ///
    /// Prunes messages older than the retention period first.
    pub fn poll(&mut self, user: &str, last_message_time: u64, now: u64) -> PollResponse {
        let cutoff = now.saturating_sub(RETENTION_MS);
        let mut messages = vec![];
        let mut expired = false;
        if let Some(buffer) = self.buffers.get_mut(user) {
            buffer.retain(|message| message.time >= cutoff);
            messages.extend(
                buffer
                    .iter()
                    .filter(|message| message.time > last_message_time)
                    .cloned(),
            );
            expired = buffer.is_empty();
        }
        if expired {
            self.buffers.remove(user);
        }
        let last_message_time = messages
            .iter()
            .map(|message| message.time)
            .max()
            .unwrap_or(last_message_time);
        PollResponse {
            messages,
            last_message_time,
        }
    }

    /// Answer a deserialized poll request.
    pub fn handle(&mut self, request: &PollRequest, now: u64) -> PollResponse {
        self.poll(&request.user_id, request.last_message_time, now)
    }

    /// Number of users with buffered messages.
    pub fn user_count(&self) -> usize {
        self.buffers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn message(kind: &str) -> Envelope {
        Envelope::new(kind, json!(null))
    }

    #[test]
    fn returns_newer_messages() {
        let mut buffer = PollBuffer::default();
        buffer.push("alice", message("a"), 100);
        buffer.push("alice", message("b"), 200);

        let response = buffer.poll("alice", 0, 300);
        assert_eq!(response.messages.len(), 2);
        assert_eq!(response.last_message_time, 200);

        let response = buffer.poll("alice", 100, 300);
        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.messages[0].envelope, message("b"));

        let response = buffer.poll("alice", 200, 300);
        assert!(response.messages.is_empty());
        assert_eq!(response.last_message_time, 200);

        assert!(buffer.poll("bob", 0, 300).messages.is_empty());
    }

    #[test]
    fn prunes_old_messages() {
        let mut buffer = PollBuffer::default();
        buffer.push("alice", message("old"), 1_000);
        buffer.push("alice", message("new"), 1_000 + RETENTION_MS);

        let response = buffer.poll("alice", 0, 2_000 + RETENTION_MS);
        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.messages[0].envelope, message("new"));

        buffer.poll("alice", 0, 10 * RETENTION_MS);
        assert_eq!(buffer.user_count(), 0);
    }

    #[test]
    fn pushes_prune_idle_users() {
        let mut buffer = PollBuffer::default();
        buffer.push("alice", message("a"), 1_000);
        buffer.push("bob", message("b"), 2_000);
        assert_eq!(buffer.user_count(), 2);

        buffer.push("carol", message("c"), 1_500 + RETENTION_MS);
        assert_eq!(buffer.user_count(), 2);
        assert!(buffer.poll("alice", 0, 1_500 + RETENTION_MS).messages.is_empty());

        assert_eq!(buffer.broadcast(&message("all"), 3_000 + RETENTION_MS), 1);
        assert_eq!(buffer.user_count(), 1);
        assert_eq!(buffer.poll("carol", 0, 3_000 + RETENTION_MS).messages.len(), 2);

        assert_eq!(buffer.prune(10 * RETENTION_MS), 1);
        assert_eq!(buffer.user_count(), 0);
    }

    #[test]
    fn request_format() -> Result<(), serde_json::Error> {
        let request: PollRequest =
            serde_json::from_str(r#"{"userId":"alice","lastMessageTime":42}"#)?;
        assert_eq!(request.user_id, "alice");
        assert_eq!(request.last_message_time, 42);

        let request: PollRequest = serde_json::from_str(r#"{"userId":"bob"}"#)?;
        assert_eq!(request.last_message_time, 0);

        let mut buffer = PollBuffer::default();
        buffer.push("bob", message("hello"), 7);
        let response = serde_json::to_value(buffer.handle(&request, 8))?;
        assert_eq!(
            response,
            json!({
                "messages": [{ "time": 7, "kind": "hello", "payload": null }],
                "lastMessageTime": 7,
            })
        );
        Ok(())
    }
}

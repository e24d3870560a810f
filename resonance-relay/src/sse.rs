//! Server-sent event streams over the relay.
//!
//! A session is driven by its owner: [`SseSession::open`] once, [`SseSession::tick`] whenever the
//! connection's timer fires, [`SseSession::close`] when the client goes away. Times are
//! milliseconds on any monotonic clock chosen by the caller.
use serde_json::json;

use crate::envelope::Envelope;
use crate::relay::Relay;

/// Default time between two heartbeats.
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 30_000;

/// A single event of a stream.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// First frame of every stream.
    Connected { user: String },
    /// Keeps idle connections open.
    Heartbeat { time: u64 },
    /// A queued application message.
    Message(Envelope),
}

impl Frame {
    pub fn envelope(&self) -> Envelope {
        match self {
            Frame::Connected { user } => Envelope::new("connected", json!({ "userId": user })),
            Frame::Heartbeat { time } => Envelope::new("heartbeat", json!({ "time": time })),
            Frame::Message(envelope) => envelope.clone(),
        }
    }

    /// The event as written to the stream: `data: <json>` followed by a blank line.
    pub fn render(&self) -> Result<String, serde_json::Error> {
        Ok(format!("data: {}\n\n", self.envelope().to_json()?))
    }
}

/// State of one streaming connection.
#[derive(Clone, Debug)]
pub struct SseSession {
    user: String,
    heartbeat_interval: u64,
    last_heartbeat: u64,
}

impl SseSession {
    /// Subscribe `user` to the relay and start a stream.
    ///
    /// Returns the session and the `Connected` frame followed by any messages queued before the
    /// connection was made.
    pub fn open(relay: &mut Relay, user: &str, now: u64) -> (SseSession, Vec<Frame>) {
        Self::with_heartbeat_interval(relay, user, now, DEFAULT_HEARTBEAT_INTERVAL_MS)
    }

    /// Like [`open`](SseSession::open) with a custom heartbeat interval.
    pub fn with_heartbeat_interval(
        relay: &mut Relay,
        user: &str,
        now: u64,
        heartbeat_interval: u64,
    ) -> (SseSession, Vec<Frame>) {
        relay.subscribe(user);
        let session = SseSession {
            user: user.to_owned(),
            heartbeat_interval: heartbeat_interval.max(1),
            last_heartbeat: now,
        };
        let mut frames = vec![Frame::Connected {
            user: user.to_owned(),
        }];
        frames.extend(relay.drain(user).into_iter().map(Frame::Message));
        (session, frames)
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Frames due at time `now`.
    ///
    /// A heartbeat is emitted when the interval elapsed since the last one, followed by the
    /// messages drained from the user's queue.
    pub fn tick(&mut self, relay: &mut Relay, now: u64) -> Vec<Frame> {
        let mut frames = vec![];
        if now.saturating_sub(self.last_heartbeat) >= self.heartbeat_interval {
            self.last_heartbeat = now;
            frames.push(Frame::Heartbeat { time: now });
        }
        frames.extend(relay.drain(&self.user).into_iter().map(Frame::Message));
        frames
    }

    /// End the stream and drop the user's queue.
    pub fn close(self, relay: &mut Relay) {
        relay.unsubscribe(&self.user);
    }
}

//! In-process relay for streaming solver updates to clients.
//!
//! Messages are JSON [`Envelope`]s kept in bounded per-user queues. Clients either hold an event
//! stream ([`sse`]) or poll ([`poll`]). All state lives in memory and is mutated through
//! `&mut self` from a single thread.
use thiserror::Error;

pub mod envelope;
pub mod http;
pub mod poll;
pub mod queue;
pub mod relay;
pub mod sse;

pub use envelope::Envelope;
pub use http::{handle_request, messages_endpoint, poll_endpoint, Response};
pub use poll::{PollBuffer, PollRequest, PollResponse};
pub use queue::BoundedQueue;
pub use relay::Relay;
pub use sse::{Frame, SseSession};

/// Reasons a request cannot be handled.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("request has no user id")]
    MissingUser,
    #[error("message has no kind")]
    MissingKind,
    #[error("method {0} is not allowed")]
    MethodNotAllowed(String),
}

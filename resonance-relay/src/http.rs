//! Request handling for the message and poll endpoints.
//!
//! Every request is answered with an envelope. Failures never escape a handler: they are logged
//! and turned into an error envelope with status 500.
use log::{debug, error};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::envelope::Envelope;
use crate::poll::{PollBuffer, PollRequest};
use crate::relay::Relay;
use crate::RelayError;

/// Headers sent with every response, any origin may call the endpoints.
pub const CORS_HEADERS: &[(&str, &str)] = &[
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// An endpoint's answer.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    /// `None` for preflight requests.
    pub body: Option<Envelope>,
}

impl Response {
    fn ok(envelope: Envelope) -> Response {
        Response {
            status: 200,
            body: Some(envelope),
        }
    }

    fn error(status: u16, err: &RelayError) -> Response {
        Response {
            status,
            body: Some(Envelope::error(err.to_string())),
        }
    }

    pub fn headers(&self) -> &'static [(&'static str, &'static str)] {
        CORS_HEADERS
    }
}

/// Dispatch on the request method and map handler errors to error envelopes.
///
/// `OPTIONS` is answered with an empty 204, methods other than `POST` with 405.
pub fn handle_request(
    method: &str,
    body: &str,
    handler: impl FnOnce(&str) -> Result<Envelope, RelayError>,
) -> Response {
    match method.to_ascii_uppercase().as_str() {
        "OPTIONS" => Response {
            status: 204,
            body: None,
        },
        "POST" => match handler(body) {
            Ok(envelope) => Response::ok(envelope),
            Err(err) => {
                error!("request failed: {}", err);
                Response::error(500, &err)
            }
        },
        _ => {
            let err = RelayError::MethodNotAllowed(method.to_owned());
            debug!("{}", err);
            Response::error(405, &err)
        }
    }
}

/// Body of a message post.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePost {
    /// Recipient, everyone if omitted.
    user_id: Option<String>,
    kind: String,
    #[serde(default)]
    payload: Value,
}

/// Publish a posted envelope to one user or to everyone.
///
/// The message goes to the stream queue and to the poll buffer. The answer is an `ack` envelope
/// with the number of stream subscribers reached.
pub fn messages_endpoint(
    relay: &mut Relay,
    polls: &mut PollBuffer,
    method: &str,
    body: &str,
    now: u64,
) -> Response {
    handle_request(method, body, |body| {
        let post: MessagePost = serde_json::from_str(body)?;
        if post.kind.is_empty() {
            return Err(RelayError::MissingKind);
        }
        let envelope = Envelope::new(post.kind, post.payload);

        let delivered = match post.user_id {
            Some(user) if user.is_empty() => return Err(RelayError::MissingUser),
            Some(user) => {
                polls.push(&user, envelope.clone(), now);
                relay.publish(&user, envelope);
                1
            }
            None => {
                polls.broadcast(&envelope, now);
                relay.broadcast(&envelope)
            }
        };

        Ok(Envelope::new("ack", json!({ "delivered": delivered })))
    })
}

/// Answer a poll request with a `messages` envelope.
pub fn poll_endpoint(polls: &mut PollBuffer, method: &str, body: &str, now: u64) -> Response {
    handle_request(method, body, |body| {
        let request: PollRequest = serde_json::from_str(body)?;
        if request.user_id.is_empty() {
            return Err(RelayError::MissingUser);
        }
        let response = polls.handle(&request, now);
        Ok(Envelope::new("messages", serde_json::to_value(response)?))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preflight_and_methods() {
        let mut relay = Relay::default();
        let mut polls = PollBuffer::default();

        let response = messages_endpoint(&mut relay, &mut polls, "options", "", 0);
        assert_eq!(response.status, 204);
        assert_eq!(response.body, None);
        assert_eq!(response.headers()[0], ("Access-Control-Allow-Origin", "*"));

        let response = messages_endpoint(&mut relay, &mut polls, "GET", "", 0);
        assert_eq!(response.status, 405);
        assert!(response.body.map_or(false, |body| body.is_error()));
    }

    #[test]
    fn errors_become_envelopes() {
        let mut relay = Relay::default();
        let mut polls = PollBuffer::default();

        let response = messages_endpoint(&mut relay, &mut polls, "POST", "{not json", 0);
        assert_eq!(response.status, 500);
        let body = response.body.unwrap();
        assert!(body.is_error());
        assert!(body.payload["message"].is_string());

        let response = messages_endpoint(&mut relay, &mut polls, "POST", r#"{"kind":""}"#, 0);
        assert_eq!(response.status, 500);

        let response = poll_endpoint(&mut polls, "POST", r#"{"userId":""}"#, 0);
        assert_eq!(
            response.body,
            Some(Envelope::error(RelayError::MissingUser.to_string()))
        );
    }

    #[test]
    fn post_then_drain_and_poll() {
        let mut relay = Relay::default();
        let mut polls = PollBuffer::default();
        relay.subscribe("bob");

        let post = r#"{"userId":"alice","kind":"solved","payload":{"cost":2}}"#;
        let response = messages_endpoint(&mut relay, &mut polls, "POST", post, 10);
        assert_eq!(
            response.body,
            Some(Envelope::new("ack", json!({ "delivered": 1 })))
        );

        let response = messages_endpoint(&mut relay, &mut polls, "POST", r#"{"kind":"tick"}"#, 20);
        assert_eq!(
            response.body,
            Some(Envelope::new("ack", json!({ "delivered": 2 })))
        );

        assert_eq!(relay.drain("alice").len(), 2);
        assert_eq!(relay.drain("bob"), vec![Envelope::new("tick", Value::Null)]);

        let poll = r#"{"userId":"alice","lastMessageTime":10}"#;
        let response = poll_endpoint(&mut polls, "POST", poll, 30);
        let body = response.body.unwrap();
        assert_eq!(body.kind, "messages");
        assert_eq!(body.payload["messages"][0]["kind"], "tick");
        assert_eq!(body.payload["lastMessageTime"], 20);
    }
}

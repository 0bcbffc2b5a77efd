//! Chat Wire Messages
//!
//! Event names and payload shapes of the chat server protocol, and their
//! translation to and from domain types.

use serde::Deserialize;
use serde_json::Value;

use super::codec::SocketPacket;
use crate::domain::GatewayEvent;

/// Presence announcement sent right after the transport connects
pub const EVENT_ADD_USER: &str = "add user";
pub const EVENT_NEW_MESSAGE: &str = "new message";
pub const EVENT_USER_JOINED: &str = "user joined";
pub const EVENT_USER_LEFT: &str = "user left";
pub const EVENT_TYPING: &str = "typing";
pub const EVENT_STOP_TYPING: &str = "stop typing";

/// Outgoing chat event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    AddUser(String),
    NewMessage(String),
    Typing,
    StopTyping,
}

impl OutboundEvent {
    /// Get the wire event name
    pub fn event_name(&self) -> &'static str {
        match self {
            OutboundEvent::AddUser(_) => EVENT_ADD_USER,
            OutboundEvent::NewMessage(_) => EVENT_NEW_MESSAGE,
            OutboundEvent::Typing => EVENT_TYPING,
            OutboundEvent::StopTyping => EVENT_STOP_TYPING,
        }
    }

    /// Convert to a Socket.IO event packet for sending
    pub fn into_packet(self) -> SocketPacket {
        let name = self.event_name();
        let args = match self {
            OutboundEvent::AddUser(identity) => vec![Value::String(identity)],
            // Author is implied by the session, only the body travels
            OutboundEvent::NewMessage(body) => vec![Value::String(body)],
            OutboundEvent::Typing | OutboundEvent::StopTyping => vec![],
        };
        SocketPacket::event(name, args)
    }
}

/// `new message` payload
#[derive(Debug, Deserialize)]
pub struct NewMessagePayload {
    pub username: String,
    pub message: String,
}

/// `user joined` / `user left` payload
#[derive(Debug, Deserialize)]
pub struct PresencePayload {
    pub username: String,
    #[serde(rename = "numUsers")]
    pub num_users: u64,
}

/// `typing` / `stop typing` payload
#[derive(Debug, Deserialize)]
pub struct TypingPayload {
    pub username: String,
}

/// Inbound payload that could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("missing payload for '{0}'")]
    Missing(&'static str),

    #[error("malformed payload for '{event}': {source}")]
    Malformed {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode an inbound chat event into its domain counterpart.
///
/// Returns `Ok(None)` for events this client does not consume.
pub fn decode_event(name: &str, args: &[Value]) -> Result<Option<GatewayEvent>, PayloadError> {
    let event = match name {
        EVENT_NEW_MESSAGE => {
            let p: NewMessagePayload = payload(EVENT_NEW_MESSAGE, args)?;
            GatewayEvent::MessageReceived {
                author: p.username,
                body: p.message,
            }
        }
        EVENT_USER_JOINED => {
            let p: PresencePayload = payload(EVENT_USER_JOINED, args)?;
            GatewayEvent::UserJoined {
                author: p.username,
                count: p.num_users,
            }
        }
        EVENT_USER_LEFT => {
            let p: PresencePayload = payload(EVENT_USER_LEFT, args)?;
            GatewayEvent::UserLeft {
                author: p.username,
                count: p.num_users,
            }
        }
        EVENT_TYPING => {
            let p: TypingPayload = payload(EVENT_TYPING, args)?;
            GatewayEvent::TypingStarted { author: p.username }
        }
        EVENT_STOP_TYPING => {
            let p: TypingPayload = payload(EVENT_STOP_TYPING, args)?;
            GatewayEvent::TypingStopped { author: p.username }
        }
        _ => return Ok(None),
    };
    Ok(Some(event))
}

fn payload<T>(event: &'static str, args: &[Value]) -> Result<T, PayloadError>
where
    T: for<'de> Deserialize<'de>,
{
    let first = args.first().ok_or(PayloadError::Missing(event))?;
    T::deserialize(first).map_err(|source| PayloadError::Malformed { event, source })
}

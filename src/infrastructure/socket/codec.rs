//! Engine.IO v4 / Socket.IO v5 framing.
//!
//! Every WebSocket text frame carries one Engine.IO packet: a single digit
//! type followed by its data. Socket.IO packets travel inside Engine.IO
//! `message` packets, so a chat event on the wire looks like
//! `42["new message","hi"]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::error::TransportError;

/// Engine.IO protocol revision spoken by this client.
pub const ENGINE_IO_VERSION: u8 = 4;

/// Handshake data carried by the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Server ping period in milliseconds
    pub ping_interval: u64,
    /// Grace period after a missed ping in milliseconds
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

/// Engine.IO packet types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, TransportError> {
        let (kind, data) = split_kind(frame)
            .ok_or_else(|| TransportError::Protocol("empty Engine.IO frame".into()))?;

        match kind {
            '0' => serde_json::from_str(data)
                .map(EnginePacket::Open)
                .map_err(|e| TransportError::Protocol(format!("invalid handshake: {}", e))),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(data.to_string())),
            '3' => Ok(EnginePacket::Pong(data.to_string())),
            '4' => Ok(EnginePacket::Message(data.to_string())),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(TransportError::Protocol(format!(
                "unknown Engine.IO packet type '{}'",
                other
            ))),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(handshake) => {
                format!("0{}", serde_json::to_string(handshake).unwrap_or_default())
            }
            EnginePacket::Close => "1".into(),
            EnginePacket::Ping(data) => format!("2{}", data),
            EnginePacket::Pong(data) => format!("3{}", data),
            EnginePacket::Message(data) => format!("4{}", data),
            EnginePacket::Upgrade => "5".into(),
            EnginePacket::Noop => "6".into(),
        }
    }
}

/// Socket.IO packet types used on the default namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, args: Vec<Value> },
    ConnectError(Value),
}

impl SocketPacket {
    /// Build an event packet.
    pub fn event(name: impl Into<String>, args: Vec<Value>) -> Self {
        SocketPacket::Event {
            name: name.into(),
            args,
        }
    }

    /// Decode the payload of an Engine.IO `message` packet.
    ///
    /// Layout: `<type>[<namespace>,][<ack id>][<json>]`. Binary packets and
    /// acknowledgements are not used by the chat protocol and are rejected.
    pub fn decode(payload: &str) -> Result<Self, TransportError> {
        let (kind, mut rest) = split_kind(payload)
            .ok_or_else(|| TransportError::Protocol("empty Socket.IO packet".into()))?;

        if rest.starts_with('/') {
            let end = rest.find(',').unwrap_or(rest.len());
            rest = rest.get(end + 1..).unwrap_or("");
        }

        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let data = &rest[digits..];

        let data: Option<Value> = if data.is_empty() {
            None
        } else {
            Some(serde_json::from_str(data).map_err(|e| {
                TransportError::Protocol(format!("invalid Socket.IO payload: {}", e))
            })?)
        };

        match kind {
            '0' => Ok(SocketPacket::Connect(data)),
            '1' => Ok(SocketPacket::Disconnect),
            '2' => {
                let Some(Value::Array(mut items)) = data else {
                    return Err(TransportError::Protocol("event payload is not an array".into()));
                };
                if items.is_empty() {
                    return Err(TransportError::Protocol("event without a name".into()));
                }
                match items.remove(0) {
                    Value::String(name) => Ok(SocketPacket::Event { name, args: items }),
                    other => Err(TransportError::Protocol(format!(
                        "event name is not a string: {}",
                        other
                    ))),
                }
            }
            '4' => Ok(SocketPacket::ConnectError(data.unwrap_or(Value::Null))),
            other => Err(TransportError::Protocol(format!(
                "unsupported Socket.IO packet type '{}'",
                other
            ))),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            SocketPacket::Connect(None) => "0".into(),
            SocketPacket::Connect(Some(auth)) => format!("0{}", auth),
            SocketPacket::Disconnect => "1".into(),
            SocketPacket::Event { name, args } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(args.iter().cloned());
                format!("2{}", Value::Array(items))
            }
            SocketPacket::ConnectError(data) => format!("4{}", data),
        }
    }

    /// Wrap into the Engine.IO packet that carries it.
    pub fn into_engine(self) -> EnginePacket {
        EnginePacket::Message(self.encode())
    }
}

/// Build the WebSocket URL for a chat endpoint.
///
/// `https://host` becomes `wss://host/socket.io/?EIO=4&transport=websocket`.
pub fn websocket_url(endpoint: &str) -> Result<String, TransportError> {
    let (scheme, rest) = endpoint
        .split_once("://")
        .ok_or_else(|| TransportError::InvalidEndpoint(endpoint.to_string()))?;

    let ws_scheme = match scheme {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(TransportError::InvalidEndpoint(endpoint.to_string())),
    };

    let base = rest.trim_end_matches('/');
    if base.is_empty() {
        return Err(TransportError::InvalidEndpoint(endpoint.to_string()));
    }

    Ok(format!(
        "{}://{}/socket.io/?EIO={}&transport=websocket",
        ws_scheme, base, ENGINE_IO_VERSION
    ))
}

fn split_kind(frame: &str) -> Option<(char, &str)> {
    let mut chars = frame.chars();
    let kind = chars.next()?;
    Some((kind, chars.as_str()))
}

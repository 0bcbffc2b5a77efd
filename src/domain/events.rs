//! Typed inbound events.
//!
//! Raw transport callbacks are decoded exactly once, at the gateway boundary,
//! into this closed set of variants. Nothing downstream sees untyped payloads.

use serde::Serialize;

/// Domain event raised by the connection gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "t", content = "d", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEvent {
    /// Transport connected and presence announced
    Connected,
    /// Transport closed, locally or by the server
    Disconnected { reason: Option<String> },
    /// Transport could not be established
    ConnectError { reason: String },
    /// Transport did not connect within the configured window
    ConnectTimeout,
    MessageReceived { author: String, body: String },
    UserJoined { author: String, count: u64 },
    UserLeft { author: String, count: u64 },
    TypingStarted { author: String },
    TypingStopped { author: String },
}

impl GatewayEvent {
    /// Get the event name for logging and metrics
    pub fn event_name(&self) -> &'static str {
        match self {
            GatewayEvent::Connected => "connected",
            GatewayEvent::Disconnected { .. } => "disconnected",
            GatewayEvent::ConnectError { .. } => "connect_error",
            GatewayEvent::ConnectTimeout => "connect_timeout",
            GatewayEvent::MessageReceived { .. } => "message_received",
            GatewayEvent::UserJoined { .. } => "user_joined",
            GatewayEvent::UserLeft { .. } => "user_left",
            GatewayEvent::TypingStarted { .. } => "typing_started",
            GatewayEvent::TypingStopped { .. } => "typing_stopped",
        }
    }

    /// Whether this event reports a connection lifecycle change.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            GatewayEvent::Connected
                | GatewayEvent::Disconnected { .. }
                | GatewayEvent::ConnectError { .. }
                | GatewayEvent::ConnectTimeout
        )
    }
}

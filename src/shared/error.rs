//! Client Error Types
//!
//! Centralized error taxonomy for the synchronization layer. Every error here
//! is recoverable: the worst outcome is a disconnected, idle client that a
//! later `connect`/`change_identity` can revive.

use crate::domain::ConnectionState;

/// Rejection of a `connect()` call. Raised synchronously, before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    #[error("Identity must not be empty")]
    EmptyIdentity,

    #[error("A connection is already active ({0})")]
    AlreadyActive(ConnectionState),
}

/// Rejection of an outbound emit.
///
/// Success only means the frame was handed to the session task; it says
/// nothing about server receipt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("Not connected")]
    NotConnected,

    #[error("Message body must not be empty")]
    EmptyBody,

    #[error("Session closed before the frame could be queued")]
    SessionClosed,
}

/// Failure of the disconnect + reconnect cycle behind an identity change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityChangeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Reconnect failed: {0}")]
    Connect(#[from] ConnectError),
}

/// Transport-level failures. These never cross the gateway boundary as
/// errors; the gateway converts them into lifecycle events.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Connection timed out")]
    Timeout,

    #[error("Transport closed")]
    Closed,
}

/// Errors surfaced by the chat coordinator to its callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Send failed: {0}")]
    Send(#[from] SendError),

    #[error("Identity change failed: {0}")]
    IdentityChange(#[from] IdentityChangeError),

    #[error("Chat coordinator has stopped")]
    Stopped,
}

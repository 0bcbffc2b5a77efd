//! Presentation-surface contract.
//!
//! The coordinator pushes every user-visible change through this trait. A
//! view owns no connection state and never calls back into the gateway.

use crate::domain::ChatMessage;
use crate::shared::error::{IdentityChangeError, SendError};

/// Connection status as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    ConnectError,
    ConnectTimeout,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::ConnectError => "connect_error",
            Self::ConnectTimeout => "connect_timeout",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub trait ChatView: Send + Sync {
    fn on_message_appended(&self, message: &ChatMessage);

    fn on_user_joined(&self, name: &str, count: u64);

    fn on_user_left(&self, name: &str, count: u64);

    fn on_typing_indicator_changed(&self, name: &str, is_typing: bool);

    fn on_connection_status(&self, status: ConnectionStatus, reason: Option<&str>);

    fn on_identity_changed(&self, name: &str);

    /// The emit for an already-appended message was rejected. The message
    /// stays on screen.
    fn on_send_failed(&self, message: &ChatMessage, error: &SendError);

    /// The reconnect behind an identity change failed; the old identity is
    /// still in effect.
    fn on_identity_change_failed(&self, error: &IdentityChangeError);
}

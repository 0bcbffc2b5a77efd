//! Connection lifecycle state.

use serde::{Deserialize, Serialize};

/// State of the single live connection.
///
/// ```text
/// Disconnected --connect()--> Connecting --transport connected--> Connected
///      ^                           |                                  |
///      +---- disconnect(), error, timeout -----------------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }

    /// Numeric encoding used by the connection state gauge.
    pub fn as_gauge(&self) -> f64 {
        match self {
            Self::Disconnected => 0.0,
            Self::Connecting => 1.0,
            Self::Connected => 2.0,
        }
    }

    /// Whether a new `connect()` would be rejected in this state.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

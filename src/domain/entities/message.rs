//! Chat message entity.

use serde::{Deserialize, Serialize};

/// Which side of the conversation produced a message.
///
/// Drives rendering on the presentation surface only; the core attaches no
/// behavior to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Originated locally and appended optimistically
    Sent,
    /// Delivered by the server
    Received,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Received => "received",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single chat line. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    author: String,
    body: String,
    direction: Direction,
}

impl ChatMessage {
    pub fn new(author: impl Into<String>, body: impl Into<String>, direction: Direction) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            direction,
        }
    }

    /// Message authored by the local user.
    pub fn sent(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(author, body, Direction::Sent)
    }

    /// Message relayed by the server from another participant.
    pub fn received(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(author, body, Direction::Received)
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_sent(&self) -> bool {
        self.direction == Direction::Sent
    }
}

//! Socket.IO Connection
//!
//! Everything needed to talk to the chat server:
//!
//! - **codec**: Engine.IO / Socket.IO packet framing
//! - **messages**: Chat event names and payload shapes
//! - **transport**: Transport and connector traits, WebSocket implementation
//! - **session**: Epoch-guarded connection bookkeeping
//! - **gateway**: The `ChatGateway` implementation

pub mod codec;
pub mod gateway;
pub mod messages;
pub mod session;
pub mod transport;

pub use gateway::ConnectionGateway;
pub use transport::{Connector, Transport, WebSocketConnector, WebSocketTransport};

//! Outbound command contract.
//!
//! Implemented by the connection gateway in the infrastructure layer and by
//! the event relay that fronts it, so the coordinator never depends on a
//! concrete transport.

use crate::domain::ConnectionState;
use crate::shared::error::{ConnectError, SendError};

/// Local acknowledgment of an emit call.
///
/// Confirms the frame was queued for the transport, not that the server
/// received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ack {
    pub id: u64,
}

/// Commands accepted by the connection layer.
///
/// Every method returns immediately. Completion and transport failures are
/// reported asynchronously as [`GatewayEvent`](crate::domain::GatewayEvent)s.
#[cfg_attr(test, mockall::automock)]
pub trait ChatGateway: Send + Sync {
    /// Open a connection announcing `identity` once the transport is up.
    fn connect(&self, identity: &str) -> Result<(), ConnectError>;

    /// Close the connection if one exists. Idempotent.
    fn disconnect(&self);

    /// Emit a chat message body on the current session.
    fn send(&self, body: &str) -> Result<Ack, SendError>;

    /// Announce that the local user started typing.
    fn start_typing(&self) -> Result<Ack, SendError>;

    /// Announce that the local user stopped typing.
    fn stop_typing(&self) -> Result<Ack, SendError>;

    /// Current connection state.
    fn state(&self) -> ConnectionState;
}

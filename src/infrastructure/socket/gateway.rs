//! Connection Gateway
//!
//! Owns the one live connection to the chat server. Commands return
//! immediately; the transport work happens on a per-connection session task
//! that reports back through a typed event channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use super::codec::SocketPacket;
use super::messages::{decode_event, OutboundEvent};
use super::session::{EmitRejected, SessionCommand, SessionHandle, SessionRegistry};
use super::transport::{Connector, Transport};
use crate::domain::{Ack, ChatGateway, ConnectionState, GatewayEvent};
use crate::infrastructure::metrics;
use crate::shared::error::{ConnectError, SendError, TransportError};

/// Disconnect reason reported when the client closes the connection
pub const REASON_CLIENT_DISCONNECT: &str = "io client disconnect";
/// Disconnect reason reported when the server closes the namespace
pub const REASON_SERVER_DISCONNECT: &str = "io server disconnect";
/// Disconnect reason reported when the transport goes away underneath us
pub const REASON_TRANSPORT_CLOSE: &str = "transport close";

/// Gateway to the chat server.
///
/// Construct once at the composition root and share by `Arc`. Inbound
/// events are written to the channel given to [`ConnectionGateway::new`] in
/// the order the network delivered them.
pub struct ConnectionGateway<C: Connector> {
    connector: Arc<C>,
    endpoint: String,
    connect_timeout: Duration,
    registry: Arc<SessionRegistry>,
    events: mpsc::UnboundedSender<GatewayEvent>,
    next_ack: AtomicU64,
}

impl<C: Connector> ConnectionGateway<C> {
    pub fn new(
        connector: C,
        endpoint: impl Into<String>,
        connect_timeout: Duration,
        events: mpsc::UnboundedSender<GatewayEvent>,
    ) -> Self {
        Self {
            connector: Arc::new(connector),
            endpoint: endpoint.into(),
            connect_timeout,
            registry: Arc::new(SessionRegistry::new()),
            events,
            next_ack: AtomicU64::new(0),
        }
    }

    fn emit(&self, event: OutboundEvent) -> Result<Ack, SendError> {
        let command = event.event_name();
        self.registry
            .emit(SessionCommand::Emit(event.into_packet()))
            .map_err(|rejected| match rejected {
                EmitRejected::NotConnected => SendError::NotConnected,
                EmitRejected::SessionClosed => SendError::SessionClosed,
            })?;

        metrics::record_command_sent(command);
        let ack = Ack {
            id: self.next_ack.fetch_add(1, Ordering::Relaxed) + 1,
        };
        trace!(command = command, ack = ack.id, "Command queued");
        Ok(ack)
    }
}

impl<C: Connector> ChatGateway for ConnectionGateway<C> {
    /// Must be called from within a Tokio runtime.
    fn connect(&self, identity: &str) -> Result<(), ConnectError> {
        if identity.trim().is_empty() {
            return Err(ConnectError::EmptyIdentity);
        }

        let epoch = self
            .registry
            .begin(|epoch| {
                let (commands, commands_rx) = mpsc::unbounded_channel();
                let session = Session {
                    epoch,
                    identity: identity.to_string(),
                    endpoint: self.endpoint.clone(),
                    connect_timeout: self.connect_timeout,
                    registry: Arc::clone(&self.registry),
                    events: self.events.clone(),
                };
                let task = tokio::spawn(session.run(Arc::clone(&self.connector), commands_rx));
                SessionHandle {
                    epoch,
                    commands,
                    task,
                }
            })
            .map_err(ConnectError::AlreadyActive)?;

        info!(identity = %identity, endpoint = %self.endpoint, epoch = epoch, "Connecting");
        Ok(())
    }

    fn disconnect(&self) {
        let (previous, session) = self.registry.reset();
        let Some(session) = session else {
            trace!("Disconnect requested with no session");
            return;
        };

        // Closing the transport is the session task's job; a task stuck in
        // connect observes the command or the dropped sender either way.
        let _ = session.commands.send(SessionCommand::Close);
        info!(epoch = session.epoch, previous = %previous, "Disconnected by client");

        if previous == ConnectionState::Connected {
            let event = GatewayEvent::Disconnected {
                reason: Some(REASON_CLIENT_DISCONNECT.to_string()),
            };
            metrics::record_event_received(event.event_name());
            let _ = self.events.send(event);
        }
    }

    fn send(&self, body: &str) -> Result<Ack, SendError> {
        if body.is_empty() {
            return Err(SendError::EmptyBody);
        }
        self.emit(OutboundEvent::NewMessage(body.to_string()))
    }

    fn start_typing(&self) -> Result<Ack, SendError> {
        self.emit(OutboundEvent::Typing)
    }

    fn stop_typing(&self) -> Result<Ack, SendError> {
        self.emit(OutboundEvent::StopTyping)
    }

    fn state(&self) -> ConnectionState {
        self.registry.state()
    }
}

impl<C: Connector> Drop for ConnectionGateway<C> {
    fn drop(&mut self) {
        if let (_, Some(session)) = self.registry.reset() {
            session.task.abort();
        }
    }
}

/// One connection attempt and, if it succeeds, its lifetime.
struct Session {
    epoch: u64,
    identity: String,
    endpoint: String,
    connect_timeout: Duration,
    registry: Arc<SessionRegistry>,
    events: mpsc::UnboundedSender<GatewayEvent>,
}

impl Session {
    async fn run<C: Connector>(
        self,
        connector: Arc<C>,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) {
        let connecting = timeout(self.connect_timeout, connector.connect(&self.endpoint));

        // A close that is already queued wins over a connect that is ready
        let result = tokio::select! {
            biased;
            _ = wait_for_close(&mut commands) => {
                debug!(epoch = self.epoch, "Connect cancelled");
                return;
            }
            result = connecting => result,
        };

        let mut transport = match result {
            Err(_) => {
                warn!(endpoint = %self.endpoint, "Connect timed out");
                self.finish(GatewayEvent::ConnectTimeout);
                return;
            }
            Ok(Err(e)) => {
                warn!(endpoint = %self.endpoint, error = %e, "Connect failed");
                self.finish(GatewayEvent::ConnectError {
                    reason: e.to_string(),
                });
                return;
            }
            Ok(Ok(transport)) => transport,
        };

        if !self.registry.is_current(self.epoch) {
            let _ = transport.close().await;
            return;
        }

        // Presence goes out before anyone hears about the connection
        let announce = OutboundEvent::AddUser(self.identity.clone());
        let command = announce.event_name();
        if let Err(e) = transport.send(announce.into_packet()).await {
            warn!(error = %e, "Presence announcement failed");
            let _ = transport.close().await;
            self.finish(GatewayEvent::ConnectError {
                reason: e.to_string(),
            });
            return;
        }
        metrics::record_command_sent(command);

        if !self.registry.transition(self.epoch, ConnectionState::Connected) {
            let _ = transport.close().await;
            return;
        }
        info!(identity = %self.identity, "Connected");
        self.publish(GatewayEvent::Connected);

        let reason = self.pump(&mut transport, &mut commands).await;
        let _ = transport.close().await;
        match reason {
            Some(reason) => {
                info!(reason = %reason, "Disconnected");
                self.finish(GatewayEvent::Disconnected {
                    reason: Some(reason),
                });
            }
            None => debug!(epoch = self.epoch, "Session closed"),
        }
    }

    /// Shuttle packets until the session ends.
    ///
    /// Returns the disconnect reason when the end came from the network, and
    /// `None` when the client asked to close.
    async fn pump<T: Transport>(
        &self,
        transport: &mut T,
        commands: &mut mpsc::UnboundedReceiver<SessionCommand>,
    ) -> Option<String> {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SessionCommand::Emit(packet)) => {
                        if let Err(e) = transport.send(packet).await {
                            warn!(error = %e, "Transport send failed");
                            return Some(e.to_string());
                        }
                    }
                    Some(SessionCommand::Close) | None => return None,
                },

                incoming = transport.recv() => match incoming {
                    Some(Ok(packet)) => {
                        if let Some(reason) = self.handle_packet(packet) {
                            return Some(reason);
                        }
                    }
                    Some(Err(TransportError::Timeout)) => {
                        warn!("Server went silent");
                        return Some("ping timeout".to_string());
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Transport receive failed");
                        return Some(e.to_string());
                    }
                    None => return Some(REASON_TRANSPORT_CLOSE.to_string()),
                },
            }
        }
    }

    /// Translate one inbound packet. Returns a reason if it ends the session.
    fn handle_packet(&self, packet: SocketPacket) -> Option<String> {
        match packet {
            SocketPacket::Event { name, args } => {
                match decode_event(&name, &args) {
                    Ok(Some(event)) => self.publish(event),
                    Ok(None) => debug!(event = %name, "Ignoring unhandled event"),
                    Err(e) => {
                        metrics::record_malformed_payload(&name);
                        warn!(event = %name, error = %e, "Dropping malformed payload");
                    }
                }
                None
            }
            SocketPacket::Disconnect => Some(REASON_SERVER_DISCONNECT.to_string()),
            SocketPacket::ConnectError(data) => Some(format!("connect error: {}", data)),
            SocketPacket::Connect(_) => {
                trace!("Duplicate namespace connect ignored");
                None
            }
        }
    }

    /// Deliver an event if this session is still the live one.
    fn publish(&self, event: GatewayEvent) {
        if !self.registry.is_current(self.epoch) {
            trace!(event = event.event_name(), "Dropping event from stale session");
            return;
        }
        metrics::record_event_received(event.event_name());
        let _ = self.events.send(event);
    }

    /// Mark the session disconnected and report why.
    fn finish(&self, event: GatewayEvent) {
        if self.registry.transition(self.epoch, ConnectionState::Disconnected) {
            metrics::record_event_received(event.event_name());
            let _ = self.events.send(event);
        }
    }
}

/// Resolve once the gateway asks the session to close.
async fn wait_for_close(commands: &mut mpsc::UnboundedReceiver<SessionCommand>) {
    loop {
        match commands.recv().await {
            Some(SessionCommand::Close) | None => return,
            Some(SessionCommand::Emit(_)) => {
                trace!("Dropping emit queued before connect completed");
            }
        }
    }
}

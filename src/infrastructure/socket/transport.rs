//! Transport abstraction for the chat connection.
//!
//! The gateway only ever sees Socket.IO packets. Engine.IO housekeeping
//! (handshake, ping/pong, liveness) is the transport's business.
//! Production uses a WebSocket via `tokio-tungstenite`; tests script packets
//! through channels.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::time::{timeout_at, Instant};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};

use super::codec::{websocket_url, EnginePacket, Handshake, SocketPacket};
use crate::shared::error::TransportError;

/// Liveness window used until the server handshake announces its own.
const DEFAULT_LIVENESS: Duration = Duration::from_secs(45);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// An established, namespace-connected chat transport.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send one packet.
    async fn send(&mut self, packet: SocketPacket) -> Result<(), TransportError>;

    /// Receive the next packet.
    ///
    /// Returns `None` once the transport is closed cleanly.
    async fn recv(&mut self) -> Option<Result<SocketPacket, TransportError>>;

    /// Close the transport. Safe to call on an already-closed transport.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Opens transports to an endpoint.
///
/// `connect` resolves once the server has accepted the Socket.IO connection,
/// which is the moment the client considers itself connected.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport;

    async fn connect(&self, endpoint: &str) -> Result<Self::Transport, TransportError>;
}

/// Production connector: Socket.IO over a (TLS) WebSocket.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    async fn connect(&self, endpoint: &str) -> Result<WebSocketTransport, TransportError> {
        let url = websocket_url(endpoint)?;
        debug!(url = %url, "Opening WebSocket");

        let (stream, _response) = tokio_tungstenite::connect_async(url).await?;
        let mut transport = WebSocketTransport {
            stream,
            liveness: DEFAULT_LIVENESS,
            last_inbound: Instant::now(),
            handshake: None,
        };
        transport.open_namespace().await?;
        debug!(sid = ?transport.sid(), "Socket.IO namespace connected");
        Ok(transport)
    }
}

/// Socket.IO session over a WebSocket stream.
pub struct WebSocketTransport {
    stream: WsStream,
    /// Silence longer than this means the server is gone
    liveness: Duration,
    /// Measured across calls; `recv` is cancelled whenever the gateway sends
    last_inbound: Instant,
    handshake: Option<Handshake>,
}

impl WebSocketTransport {
    /// Engine.IO session id, available after the handshake.
    pub fn sid(&self) -> Option<&str> {
        self.handshake.as_ref().map(|h| h.sid.as_str())
    }

    /// Complete the Engine.IO handshake and connect the default namespace.
    async fn open_namespace(&mut self) -> Result<(), TransportError> {
        match self.next_engine_packet().await {
            Some(Ok(EnginePacket::Open(handshake))) => {
                self.liveness =
                    Duration::from_millis(handshake.ping_interval + handshake.ping_timeout);
                debug!(
                    sid = %handshake.sid,
                    ping_interval = handshake.ping_interval,
                    "Engine.IO handshake complete"
                );
                self.handshake = Some(handshake);
            }
            Some(Ok(other)) => {
                return Err(TransportError::Protocol(format!(
                    "expected open packet, got {:?}",
                    other
                )))
            }
            Some(Err(e)) => return Err(e),
            None => return Err(TransportError::Closed),
        }

        self.write(SocketPacket::Connect(None).into_engine()).await?;

        loop {
            match self.next_engine_packet().await {
                Some(Ok(EnginePacket::Ping(data))) => self.write(EnginePacket::Pong(data)).await?,
                Some(Ok(EnginePacket::Message(payload))) => match SocketPacket::decode(&payload)? {
                    SocketPacket::Connect(_) => return Ok(()),
                    SocketPacket::ConnectError(data) => {
                        return Err(TransportError::Protocol(format!(
                            "namespace connect rejected: {}",
                            data
                        )))
                    }
                    other => trace!(packet = ?other, "Ignoring packet before namespace connect"),
                },
                Some(Ok(EnginePacket::Close)) | None => return Err(TransportError::Closed),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e),
            }
        }
    }

    /// Read frames until one decodes as an Engine.IO packet.
    async fn next_engine_packet(&mut self) -> Option<Result<EnginePacket, TransportError>> {
        loop {
            let deadline = self.last_inbound + self.liveness;
            let frame = match timeout_at(deadline, self.stream.next()).await {
                Err(_) => return Some(Err(TransportError::Timeout)),
                Ok(None) => return None,
                Ok(Some(Err(e))) => return Some(Err(e.into())),
                Ok(Some(Ok(frame))) => frame,
            };
            self.last_inbound = Instant::now();

            match frame {
                Message::Text(text) => match EnginePacket::decode(text.as_str()) {
                    Ok(packet) => return Some(Ok(packet)),
                    Err(e) => {
                        warn!(error = %e, "Dropping undecodable Engine.IO frame");
                        continue;
                    }
                },
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    async fn write(&mut self, packet: EnginePacket) -> Result<(), TransportError> {
        let text = packet.encode();
        trace!(frame = %text, "Sending frame");
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, packet: SocketPacket) -> Result<(), TransportError> {
        self.write(packet.into_engine()).await
    }

    async fn recv(&mut self) -> Option<Result<SocketPacket, TransportError>> {
        loop {
            match self.next_engine_packet().await? {
                Ok(EnginePacket::Ping(data)) => {
                    if let Err(e) = self.write(EnginePacket::Pong(data)).await {
                        return Some(Err(e));
                    }
                }
                Ok(EnginePacket::Message(payload)) => match SocketPacket::decode(&payload) {
                    Ok(packet) => return Some(Ok(packet)),
                    Err(e) => {
                        // A bad frame must not end the session
                        warn!(error = %e, "Dropping undecodable Socket.IO packet");
                    }
                },
                Ok(EnginePacket::Close) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let _ = self.write(SocketPacket::Disconnect.into_engine()).await;
        match self.stream.close(None).await {
            Ok(())
            | Err(tokio_tungstenite::tungstenite::Error::ConnectionClosed)
            | Err(tokio_tungstenite::tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

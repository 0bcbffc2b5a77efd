//! Event Relay
//!
//! Sits between the connection gateway and the chat coordinator. Inbound
//! events go to at most one subscriber; outbound commands go straight to the
//! gateway. Neither side holds a reference to the other, so either can be
//! replaced independently.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::domain::{Ack, ChatGateway, ConnectionState, GatewayEvent};
use crate::shared::error::{ConnectError, SendError};

/// The receiving end of a relay subscription.
///
/// Only the most recent subscription receives events. Once replaced, a
/// subscription yields whatever was already delivered to it and then `None`.
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<GatewayEvent>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<GatewayEvent> {
        self.receiver.recv().await
    }

    /// Non-blocking receive; `None` if nothing is pending or the
    /// subscription has been replaced.
    pub fn try_recv(&mut self) -> Option<GatewayEvent> {
        self.receiver.try_recv().ok()
    }
}

type ListenerSlot = Arc<Mutex<Option<mpsc::UnboundedSender<GatewayEvent>>>>;

/// Single-subscriber pass-through between gateway and coordinator.
pub struct EventRelay<G: ChatGateway> {
    gateway: Arc<G>,
    listener: ListenerSlot,
    pump: JoinHandle<()>,
}

impl<G: ChatGateway> EventRelay<G> {
    /// Start relaying `events` (the gateway's outbound event stream).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(gateway: Arc<G>, mut events: mpsc::UnboundedReceiver<GatewayEvent>) -> Self {
        let listener: ListenerSlot = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&listener);

        let pump = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                dispatch(&slot, event);
            }
            debug!("Gateway event stream ended");
        });

        Self {
            gateway,
            listener,
            pump,
        }
    }

    /// Replace the current listener. The previous one receives nothing further.
    pub fn set_listener(&self, listener: mpsc::UnboundedSender<GatewayEvent>) {
        let replaced = self.listener.lock().replace(listener).is_some();
        debug!(replaced = replaced, "Listener registered");
    }

    /// Register a fresh listener and return its receiving end.
    pub fn subscribe(&self) -> Subscription {
        let (tx, receiver) = mpsc::unbounded_channel();
        self.set_listener(tx);
        Subscription { receiver }
    }

    pub fn has_listener(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Deliver one event to the current listener, or drop it.
    pub fn dispatch(&self, event: GatewayEvent) {
        dispatch(&self.listener, event);
    }
}

fn dispatch(slot: &ListenerSlot, event: GatewayEvent) {
    let mut listener = slot.lock();
    match listener.as_ref() {
        Some(tx) => {
            let name = event.event_name();
            let lifecycle = event.is_lifecycle();
            if tx.send(event).is_err() {
                debug!(event = name, "Listener went away, dropping it");
                *listener = None;
            } else if lifecycle {
                debug!(event = name, "Lifecycle event relayed");
            } else {
                trace!(event = name, "Event relayed");
            }
        }
        None => trace!(event = event.event_name(), "No listener, event dropped"),
    }
}

impl<G: ChatGateway> ChatGateway for EventRelay<G> {
    fn connect(&self, identity: &str) -> Result<(), ConnectError> {
        trace!(identity = %identity, "relay: connect");
        self.gateway.connect(identity)
    }

    fn disconnect(&self) {
        trace!("relay: disconnect");
        self.gateway.disconnect()
    }

    fn send(&self, body: &str) -> Result<Ack, SendError> {
        trace!(len = body.len(), "relay: send");
        self.gateway.send(body)
    }

    fn start_typing(&self) -> Result<Ack, SendError> {
        trace!("relay: start typing");
        self.gateway.start_typing()
    }

    fn stop_typing(&self) -> Result<Ack, SendError> {
        trace!("relay: stop typing");
        self.gateway.stop_typing()
    }

    fn state(&self) -> ConnectionState {
        self.gateway.state()
    }
}

impl<G: ChatGateway> Drop for EventRelay<G> {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

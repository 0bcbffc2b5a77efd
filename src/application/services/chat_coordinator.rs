//! Chat Coordinator
//!
//! Application behavior on top of the relay: optimistic sends, identity
//! changes (disconnect + reconnect) and the typing debounce. All of it runs
//! on one task, so handlers never race each other.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::relay::Subscription;
use super::typing::{TypingState, TypingTicket};
use crate::application::view::{ChatView, ConnectionStatus};
use crate::domain::{Ack, ChatGateway, ChatMessage, ConnectionState, GatewayEvent, Identity};
use crate::shared::error::{ChatError, ConnectError, IdentityChangeError};
use crate::shared::validation::{validate_display_name, validate_message_body};

/// Intent issued by the presentation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    SendMessage(String),
    ChangeIdentity(String),
    Keystroke,
    StopTyping,
    Shutdown,
}

impl ChatCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendMessage(_) => "send_message",
            Self::ChangeIdentity(_) => "change_identity",
            Self::Keystroke => "keystroke",
            Self::StopTyping => "stop_typing",
            Self::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug)]
enum Inbox {
    Command(ChatCommand),
    TypingDeadline(TypingTicket),
}

/// Cloneable handle for issuing commands to a running coordinator.
#[derive(Debug, Clone)]
pub struct ChatHandle {
    inbox: mpsc::UnboundedSender<Inbox>,
}

impl ChatHandle {
    pub fn send_message(&self, body: impl Into<String>) -> Result<(), ChatError> {
        self.command(ChatCommand::SendMessage(body.into()))
    }

    pub fn change_identity(&self, name: impl Into<String>) -> Result<(), ChatError> {
        self.command(ChatCommand::ChangeIdentity(name.into()))
    }

    pub fn notify_keystroke(&self) -> Result<(), ChatError> {
        self.command(ChatCommand::Keystroke)
    }

    pub fn stop_typing(&self) -> Result<(), ChatError> {
        self.command(ChatCommand::StopTyping)
    }

    pub fn shutdown(&self) -> Result<(), ChatError> {
        self.command(ChatCommand::Shutdown)
    }

    pub fn command(&self, command: ChatCommand) -> Result<(), ChatError> {
        self.inbox
            .send(Inbox::Command(command))
            .map_err(|_| ChatError::Stopped)
    }
}

pub struct ChatCoordinator<G: ChatGateway, V: ChatView> {
    gateway: Arc<G>,
    view: Arc<V>,
    identity: Identity,
    typing: TypingState,
    typing_timer: Option<JoinHandle<()>>,
    inbox_tx: mpsc::UnboundedSender<Inbox>,
    inbox_rx: Option<mpsc::UnboundedReceiver<Inbox>>,
}

impl<G, V> ChatCoordinator<G, V>
where
    G: ChatGateway + 'static,
    V: ChatView + 'static,
{
    pub fn new(gateway: Arc<G>, view: Arc<V>, identity: Identity, typing_timeout: Duration) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            view,
            identity,
            typing: TypingState::new(typing_timeout),
            typing_timer: None,
            inbox_tx,
            inbox_rx: Some(inbox_rx),
        }
    }

    pub fn handle(&self) -> ChatHandle {
        ChatHandle {
            inbox: self.inbox_tx.clone(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn typing(&self) -> &TypingState {
        &self.typing
    }

    /// Open the initial connection under the current identity.
    pub fn connect(&self) -> Result<(), ConnectError> {
        self.gateway.connect(self.identity.name())
    }

    /// Append the message locally, then emit it.
    ///
    /// A rejected emit is reported to the view; the appended message stays.
    #[instrument(skip(self, body), fields(author = %self.identity))]
    pub fn send_message(&mut self, body: &str) -> Result<Ack, ChatError> {
        let body = validate_message_body(body).map_err(ChatError::Validation)?;
        let message = ChatMessage::sent(self.identity.name(), body.as_str());
        self.view.on_message_appended(&message);

        match self.gateway.send(&body) {
            Ok(ack) => {
                debug!(ack = ack.id, "Message emitted");
                Ok(ack)
            }
            Err(e) => {
                warn!(error = %e, "Message emit rejected");
                self.view.on_send_failed(&message, &e);
                Err(e.into())
            }
        }
    }

    /// Reconnect under a new name.
    ///
    /// Not atomic: when the reconnect is rejected the connection is gone and
    /// the previous identity remains.
    #[instrument(skip(self), fields(current = %self.identity))]
    pub fn change_identity(&mut self, name: &str) -> Result<(), IdentityChangeError> {
        let name = validate_display_name(name).map_err(IdentityChangeError::Validation)?;

        // Typing belonged to the old session
        self.cancel_typing_timer();
        self.typing.stop();

        self.gateway.disconnect();
        if let Err(e) = self.gateway.connect(&name) {
            let error = IdentityChangeError::from(e);
            warn!(error = %error, "Identity change failed");
            self.view.on_identity_change_failed(&error);
            return Err(error);
        }

        self.identity.set(name.as_str());
        info!(identity = %name, "Identity changed");
        self.view.on_identity_changed(&name);
        Ok(())
    }

    /// Register a keystroke: announce typing on the first one of a burst and
    /// push the stop deadline out.
    pub fn on_keystroke(&mut self) {
        let keystroke = self.typing.keystroke(Instant::now());
        if keystroke.started {
            if let Err(e) = self.gateway.start_typing() {
                debug!(error = %e, "Typing start not announced");
            }
        }
        self.schedule_typing_deadline(keystroke.ticket);
    }

    /// A deadline check fired. Only the latest one can stop typing.
    pub fn on_typing_deadline(&mut self, ticket: TypingTicket) {
        if !self.typing.expire(ticket) {
            return;
        }
        self.typing_timer = None;
        if let Err(e) = self.gateway.stop_typing() {
            debug!(error = %e, "Typing stop not announced");
        }
    }

    /// Explicit stop signal from the presentation surface.
    pub fn stop_typing(&mut self) {
        self.cancel_typing_timer();
        if self.typing.stop() {
            if let Err(e) = self.gateway.stop_typing() {
                debug!(error = %e, "Typing stop not announced");
            }
        }
    }

    /// Route one inbound event to the view.
    pub fn handle_event(&mut self, event: GatewayEvent) {
        match event {
            GatewayEvent::Connected => {
                self.view.on_connection_status(ConnectionStatus::Connected, None)
            }
            GatewayEvent::Disconnected { reason } => {
                // A disconnect queued by a superseded session arrives after
                // the new one is up; its typing burst still needs its stop.
                if self.gateway.state() == ConnectionState::Connected {
                    debug!("Disconnect from a previous session, typing kept");
                } else {
                    self.cancel_typing_timer();
                    self.typing.stop();
                }
                self.view
                    .on_connection_status(ConnectionStatus::Disconnected, reason.as_deref())
            }
            GatewayEvent::ConnectError { reason } => self
                .view
                .on_connection_status(ConnectionStatus::ConnectError, Some(reason.as_str())),
            GatewayEvent::ConnectTimeout => self
                .view
                .on_connection_status(ConnectionStatus::ConnectTimeout, None),
            GatewayEvent::MessageReceived { author, body } => {
                self.view
                    .on_message_appended(&ChatMessage::received(author, body))
            }
            GatewayEvent::UserJoined { author, count } => self.view.on_user_joined(&author, count),
            GatewayEvent::UserLeft { author, count } => self.view.on_user_left(&author, count),
            GatewayEvent::TypingStarted { author } => {
                self.view.on_typing_indicator_changed(&author, true)
            }
            GatewayEvent::TypingStopped { author } => {
                self.view.on_typing_indicator_changed(&author, false)
            }
        }
    }

    /// Apply one presentation command. Returns false on shutdown.
    pub fn execute(&mut self, command: ChatCommand) -> bool {
        debug!(command = command.as_str(), "Executing command");
        match command {
            ChatCommand::SendMessage(body) => {
                if let Err(ChatError::Validation(reason)) = self.send_message(&body) {
                    debug!(reason = %reason, "Message not sent");
                }
            }
            ChatCommand::ChangeIdentity(name) => {
                if let Err(IdentityChangeError::Validation(reason)) = self.change_identity(&name) {
                    debug!(reason = %reason, "Identity unchanged");
                }
            }
            ChatCommand::Keystroke => self.on_keystroke(),
            ChatCommand::StopTyping => self.stop_typing(),
            ChatCommand::Shutdown => return false,
        }
        true
    }

    /// Serve commands, deadlines and relay events until shut down or the
    /// subscription closes.
    pub async fn run(mut self, mut subscription: Subscription) {
        let Some(mut inbox) = self.inbox_rx.take() else {
            warn!("Coordinator already ran");
            return;
        };
        info!(identity = %self.identity, "Chat coordinator started");

        loop {
            tokio::select! {
                item = inbox.recv() => match item {
                    Some(Inbox::Command(command)) => {
                        if !self.execute(command) {
                            break;
                        }
                    }
                    Some(Inbox::TypingDeadline(ticket)) => self.on_typing_deadline(ticket),
                    None => break,
                },

                event = subscription.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        info!("Event subscription closed");
                        break;
                    }
                },
            }
        }

        self.cancel_typing_timer();
        info!("Chat coordinator stopped");
    }

    fn schedule_typing_deadline(&mut self, ticket: TypingTicket) {
        self.cancel_typing_timer();
        let inbox = self.inbox_tx.clone();
        self.typing_timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(ticket.deadline).await;
            let _ = inbox.send(Inbox::TypingDeadline(ticket));
        }));
    }

    fn cancel_typing_timer(&mut self) {
        if let Some(timer) = self.typing_timer.take() {
            timer.abort();
        }
    }
}

impl<G: ChatGateway, V: ChatView> Drop for ChatCoordinator<G, V> {
    fn drop(&mut self) {
        if let Some(timer) = self.typing_timer.take() {
            timer.abort();
        }
    }
}

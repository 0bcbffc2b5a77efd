//! Application Startup
//!
//! Composition root: builds the one gateway, relay and coordinator the
//! process uses and drives them from the console.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::application::services::{ChatCoordinator, ChatHandle, EventRelay};
use crate::config::Settings;
use crate::domain::{ChatGateway, Identity};
use crate::infrastructure::metrics;
use crate::infrastructure::socket::{ConnectionGateway, WebSocketConnector};
use crate::presentation::{parse, Command, ConsoleView};
use crate::shared::validation::validate_display_name;

type Gateway = ConnectionGateway<WebSocketConnector>;

/// Application instance
pub struct Application {
    relay: Arc<EventRelay<Gateway>>,
    handle: ChatHandle,
    coordinator: JoinHandle<()>,
}

impl Application {
    /// Build the application from settings and start connecting.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(settings: Settings) -> Result<Self> {
        let identity = match &settings.identity.initial {
            Some(name) => Identity::chosen(validate_display_name(name).map_err(|e| anyhow!(e))?),
            None => Identity::generate(&settings.identity.suffix),
        };

        let (events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();
        let gateway = Arc::new(ConnectionGateway::new(
            WebSocketConnector,
            settings.server.url.clone(),
            settings.server.connect_timeout(),
            events_tx,
        ));
        let relay = Arc::new(EventRelay::start(gateway, events_rx));
        let subscription = relay.subscribe();

        let coordinator = ChatCoordinator::new(
            Arc::clone(&relay),
            Arc::new(ConsoleView::new()),
            identity,
            settings.typing.timeout(),
        );
        coordinator.connect()?;
        tracing::info!(
            identity = %coordinator.identity(),
            endpoint = %settings.server.url,
            "Chat client started"
        );

        let handle = coordinator.handle();
        let coordinator = tokio::spawn(coordinator.run(subscription));

        Ok(Self {
            relay,
            handle,
            coordinator,
        })
    }

    /// Handle for issuing chat commands
    pub fn handle(&self) -> ChatHandle {
        self.handle.clone()
    }

    /// Read console input until `/quit`, EOF or Ctrl-C.
    pub async fn run_until_stopped(self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if !self.dispatch(&line)? {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted");
                    break;
                }
            }
        }

        self.shutdown().await
    }

    /// Turn one console line into chat commands. Returns false on quit.
    fn dispatch(&self, line: &str) -> Result<bool> {
        match parse(line) {
            Command::Message { content } => {
                if !content.is_empty() {
                    self.handle.notify_keystroke()?;
                    self.handle.send_message(content)?;
                }
            }
            Command::Nick { name } => self.handle.change_identity(name)?,
            Command::Quit => return Ok(false),
            Command::Unknown { input } => eprintln!("Unknown command: {}", input),
            Command::InvalidArgs { command, error } => eprintln!("/{}: {}", command, error),
        }
        Ok(true)
    }

    async fn shutdown(self) -> Result<()> {
        // The coordinator may already be gone; shutting down twice is fine
        let _ = self.handle.shutdown();
        self.coordinator.await?;
        self.relay.disconnect();
        tracing::debug!(metrics = %metrics::gather_metrics(), "Final metrics");
        tracing::info!("Chat client stopped");
        Ok(())
    }
}

//! # Chat Client
//!
//! Console chat client for a Socket.IO chat room.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - The connection gateway, event relay and chat coordinator

use anyhow::Result;
use tracing::info;

use chat_client::config::Settings;
use chat_client::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    chat_client::telemetry::init_tracing();

    info!("Starting Chat Client...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        url = %settings.server.url,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings)?;

    println!("Type a message and press enter. /nick <name> renames, /quit exits.");
    application.run_until_stopped().await?;

    Ok(())
}

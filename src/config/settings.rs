//! Application settings and configuration structures.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::DEFAULT_NAME_SUFFIX;

/// The fixed chat endpoint the client talks to unless overridden.
pub const DEFAULT_SERVER_URL: &str = "https://socket-io-chat.now.sh";

/// Root configuration structure containing all client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Chat server endpoint
    pub server: ServerSettings,

    /// Typing indicator configuration
    pub typing: TypingSettings,

    /// Display name configuration
    pub identity: IdentitySettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Chat server connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Endpoint URL (http, https, ws or wss)
    pub url: String,

    /// How long a connect attempt may take before `ConnectTimeout` (ms)
    pub connect_timeout_ms: u64,
}

/// Typing indicator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TypingSettings {
    /// Idle window after the last keystroke before `stop typing` (ms)
    pub timeout_ms: u64,
}

/// Display name configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySettings {
    /// Suffix appended to generated names
    pub suffix: String,

    /// Name to connect with instead of a generated one
    pub initial: Option<String>,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::builder(&environment)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__URL=wss://... -> server.url
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.url", std::env::var("CHAT_SERVER_URL").ok())?
            .set_override_option("identity.initial", std::env::var("CHAT_USERNAME").ok())?
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    /// Settings made of built-in defaults only.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder("development")?
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", environment)?
            .set_default("server.url", DEFAULT_SERVER_URL)?
            .set_default("server.connect_timeout_ms", 20_000_i64)?
            .set_default("typing.timeout_ms", 3_000_i64)?
            .set_default("identity.suffix", DEFAULT_NAME_SUFFIX)
    }

    fn validate(settings: Self) -> Result<Self, ConfigError> {
        let scheme_ok = ["http://", "https://", "ws://", "wss://"]
            .iter()
            .any(|scheme| settings.server.url.starts_with(scheme));
        if !scheme_ok {
            return Err(ConfigError::Message(format!(
                "server.url must use http, https, ws or wss: {}",
                settings.server.url
            )));
        }
        if settings.typing.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "typing.timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(settings)
    }
}

impl ServerSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl TypingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

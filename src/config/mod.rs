//! # Configuration Module
//!
//! This module handles client configuration loading and management.
//! Configuration can be loaded from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_client::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Connecting to {}", settings.server.url);
//! ```

mod settings;

pub use settings::*;

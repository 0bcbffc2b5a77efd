//! # Chat Client Library
//!
//! This crate provides the realtime synchronization layer of a chat client:
//! - A single Socket.IO connection to the chat server
//! - A single-subscriber relay between connection and application logic
//! - A coordinator for sending, identity changes and typing indicators
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Messages, identity, connection state, typed events
//! - **Application Layer**: Event relay, chat coordinator, view contract
//! - **Infrastructure Layer**: Socket.IO gateway, WebSocket transport, metrics
//! - **Presentation Layer**: Console view and command parsing
//!
//! ## Module Structure
//!
//! ```text
//! chat_client/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, value objects, events, gateway trait
//! +-- application/    Relay, coordinator and view contract
//! +-- infrastructure/ Socket.IO connection and metrics
//! +-- presentation/   Console surface
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core vocabulary
pub mod domain;

// Application layer - Chat behavior
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - Console surface
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and wiring
pub mod startup;

// Telemetry and observability
pub mod telemetry;

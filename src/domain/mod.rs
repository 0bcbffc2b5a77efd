//! # Domain Layer
//!
//! The domain layer contains the core vocabulary of the chat client.
//! It is independent of any transport or presentation concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (ChatMessage, Identity)
//! - **value_objects**: Immutable value types (ConnectionState)
//! - **events**: Typed inbound events decoded at the transport boundary
//! - **gateway**: The outbound command contract implemented by infrastructure
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Gateway trait defines the connection contract
//! - Entities are immutable or mutated through a single documented operation

pub mod entities;
pub mod events;
pub mod gateway;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use events::GatewayEvent;
pub use gateway::{Ack, ChatGateway};
pub use value_objects::*;

//! Application Services
//!
//! ## Available Services
//!
//! - **EventRelay**: Single-subscriber pass-through in front of the gateway
//! - **ChatCoordinator**: Sending, identity changes, typing debounce
//! - **TypingState**: Generation-counted debounce state

pub mod chat_coordinator;
pub mod relay;
pub mod typing;

// Re-export relay types
pub use relay::{EventRelay, Subscription};

// Re-export coordinator types
pub use chat_coordinator::{ChatCommand, ChatCoordinator, ChatHandle};

// Re-export typing types
pub use typing::{Keystroke, TypingState, TypingTicket, DEFAULT_TYPING_TIMEOUT};

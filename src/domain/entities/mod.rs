//! # Domain Entities
//!
//! - **ChatMessage**: A chat line, tagged with the side that produced it
//! - **Identity**: The process-wide display name

mod identity;
mod message;

pub use identity::{Identity, DEFAULT_NAME_SUFFIX};
pub use message::{ChatMessage, Direction};

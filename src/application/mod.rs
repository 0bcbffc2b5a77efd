//! Application Layer
//!
//! Coordinates the flow between the connection gateway and the presentation
//! surface: the event relay, the chat coordinator and the view contract.

pub mod services;
pub mod view;

pub use view::{ChatView, ConnectionStatus};

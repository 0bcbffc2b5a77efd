//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.

mod connection_state;

pub use connection_state::*;

//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - The Socket.IO connection gateway and its WebSocket transport
//! - Prometheus metrics

pub mod metrics;
pub mod socket;

//! Prometheus Metrics Module
//!
//! Provides process-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Inbound domain events by name
//! - Outbound commands by wire event name
//! - Malformed inbound payloads by wire event name
//! - Connection state gauge

use once_cell::sync::Lazy;
use prometheus::{Encoder, Gauge, IntCounterVec, Opts, Registry, TextEncoder};

use crate::domain::ConnectionState;

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Inbound events delivered by the gateway, by domain event name
pub static EVENTS_RECEIVED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("events_received_total", "Total number of inbound domain events")
            .namespace("chat_client"),
        &["event"],
    )
    .expect("Failed to create EVENTS_RECEIVED_TOTAL metric")
});

/// Outbound commands queued for the transport, by wire event name
pub static COMMANDS_SENT_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("commands_sent_total", "Total number of outbound commands")
            .namespace("chat_client"),
        &["command"],
    )
    .expect("Failed to create COMMANDS_SENT_TOTAL metric")
});

/// Inbound payloads dropped because they could not be decoded
pub static MALFORMED_PAYLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "malformed_payloads_total",
            "Total number of dropped malformed inbound payloads",
        )
        .namespace("chat_client"),
        &["event"],
    )
    .expect("Failed to create MALFORMED_PAYLOADS_TOTAL metric")
});

/// Connection state (0 disconnected, 1 connecting, 2 connected)
pub static CONNECTION_STATE: Lazy<Gauge> = Lazy::new(|| {
    Gauge::with_opts(
        Opts::new("connection_state", "Current connection state").namespace("chat_client"),
    )
    .expect("Failed to create CONNECTION_STATE metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(EVENTS_RECEIVED_TOTAL.clone()))
        .expect("Failed to register EVENTS_RECEIVED_TOTAL");
    registry
        .register(Box::new(COMMANDS_SENT_TOTAL.clone()))
        .expect("Failed to register COMMANDS_SENT_TOTAL");
    registry
        .register(Box::new(MALFORMED_PAYLOADS_TOTAL.clone()))
        .expect("Failed to register MALFORMED_PAYLOADS_TOTAL");
    registry
        .register(Box::new(CONNECTION_STATE.clone()))
        .expect("Failed to register CONNECTION_STATE");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record an inbound domain event
pub fn record_event_received(event: &str) {
    Lazy::force(&REGISTRY);
    EVENTS_RECEIVED_TOTAL.with_label_values(&[event]).inc();
}

/// Helper to record an outbound command
pub fn record_command_sent(command: &str) {
    Lazy::force(&REGISTRY);
    COMMANDS_SENT_TOTAL.with_label_values(&[command]).inc();
}

/// Helper to record a dropped inbound payload
pub fn record_malformed_payload(event: &str) {
    Lazy::force(&REGISTRY);
    MALFORMED_PAYLOADS_TOTAL.with_label_values(&[event]).inc();
}

/// Helper to update the connection state gauge
pub fn set_connection_state(state: ConnectionState) {
    Lazy::force(&REGISTRY);
    CONNECTION_STATE.set(state.as_gauge());
}

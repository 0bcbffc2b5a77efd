//! Connection gateway lifecycle tests.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use chat_client::domain::{ChatGateway, ConnectionState, GatewayEvent};
use chat_client::infrastructure::socket::codec::SocketPacket;
use chat_client::shared::error::{ConnectError, SendError};

use crate::common::GatewayHarness;

#[tokio::test]
async fn test_connect_announces_presence_before_connected() {
    let mut h = GatewayHarness::new();
    let mut server = h.connector.accept_next();

    assert_ok!(h.gateway.connect("alice"));
    assert_eq!(h.gateway.state(), ConnectionState::Connecting);

    let (name, args) = server.next_emit().await;
    assert_eq!(name, "add user");
    assert_eq!(args, vec![json!("alice")]);

    assert_eq!(h.next_event().await, GatewayEvent::Connected);
    assert_eq!(h.gateway.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_connect_rejections() {
    let h = GatewayHarness::new();
    let _server = h.connector.accept_next();

    assert_eq!(h.gateway.connect("  "), Err(ConnectError::EmptyIdentity));
    assert_eq!(h.gateway.state(), ConnectionState::Disconnected);

    h.gateway.connect("alice").unwrap();
    assert_eq!(
        h.gateway.connect("bob"),
        Err(ConnectError::AlreadyActive(ConnectionState::Connecting))
    );
    assert_eq!(h.connector.attempts(), 0);
}

#[tokio::test]
async fn test_send_requires_connection() {
    let mut h = GatewayHarness::new();
    let mut server = h.connector.accept_next();

    assert_eq!(h.gateway.send("hi"), Err(SendError::NotConnected));
    h.gateway.connect("alice").unwrap();
    assert_eq!(h.gateway.send("hi"), Err(SendError::NotConnected));

    server.next_emit().await;
    assert_eq!(h.next_event().await, GatewayEvent::Connected);

    assert_eq!(h.gateway.send(""), Err(SendError::EmptyBody));
    let first = h.gateway.send("hello").unwrap();
    let second = h.gateway.send("again").unwrap();
    assert!(second.id > first.id);

    assert_eq!(server.next_emit().await, ("new message".to_string(), vec![json!("hello")]));
    assert_eq!(server.next_emit().await, ("new message".to_string(), vec![json!("again")]));
}

#[tokio::test]
async fn test_typing_signals_carry_no_payload() {
    let mut h = GatewayHarness::new();
    let mut server = h.connector.accept_next();
    h.gateway.connect("alice").unwrap();
    server.next_emit().await;
    h.next_event().await;

    h.gateway.start_typing().unwrap();
    h.gateway.stop_typing().unwrap();
    assert_eq!(server.next_emit().await, ("typing".to_string(), vec![]));
    assert_eq!(server.next_emit().await, ("stop typing".to_string(), vec![]));
}

#[tokio::test]
async fn test_inbound_events_decoded_in_order() {
    let mut h = GatewayHarness::new();
    let mut server = h.connector.accept_next();
    h.gateway.connect("alice").unwrap();
    server.next_emit().await;
    h.next_event().await;

    server.emit("user joined", json!({"username": "bob", "numUsers": 2}));
    server.emit("typing", json!({"username": "bob"}));
    server.emit("new message", json!({"username": "bob", "message": "hi"}));
    server.emit("stop typing", json!({"username": "bob"}));
    server.emit("user left", json!({"username": "bob", "numUsers": 1}));

    assert_eq!(
        h.next_event().await,
        GatewayEvent::UserJoined { author: "bob".into(), count: 2 }
    );
    assert_eq!(h.next_event().await, GatewayEvent::TypingStarted { author: "bob".into() });
    assert_eq!(
        h.next_event().await,
        GatewayEvent::MessageReceived { author: "bob".into(), body: "hi".into() }
    );
    assert_eq!(h.next_event().await, GatewayEvent::TypingStopped { author: "bob".into() });
    assert_eq!(
        h.next_event().await,
        GatewayEvent::UserLeft { author: "bob".into(), count: 1 }
    );
}

#[tokio::test]
async fn test_malformed_and_unknown_events_are_dropped() {
    let mut h = GatewayHarness::new();
    let mut server = h.connector.accept_next();
    h.gateway.connect("alice").unwrap();
    server.next_emit().await;
    h.next_event().await;

    server.emit("new message", json!({"message": "no author"}));
    server.emit("user joined", json!({"username": "bob", "numUsers": "two"}));
    server.emit("login", json!({"numUsers": 3}));
    server.push(SocketPacket::event("typing", vec![]));
    server.emit("user joined", json!({"username": "carol", "numUsers": 3}));

    assert_eq!(
        h.next_event().await,
        GatewayEvent::UserJoined { author: "carol".into(), count: 3 }
    );
    assert_eq!(h.gateway.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_client_disconnect_reports_once() {
    let mut h = GatewayHarness::new();
    let mut server = h.connector.accept_next();
    h.gateway.connect("alice").unwrap();
    server.next_emit().await;
    h.next_event().await;

    h.gateway.disconnect();
    assert_eq!(h.gateway.state(), ConnectionState::Disconnected);
    assert_eq!(
        h.next_event().await,
        GatewayEvent::Disconnected { reason: Some("io client disconnect".into()) }
    );

    h.gateway.disconnect();
    assert_eq!(h.settle().await, None);
    assert!(server.is_closed());
    assert_err!(h.gateway.send("late"));
}

#[tokio::test]
async fn test_disconnect_when_idle_is_noop() {
    let mut h = GatewayHarness::new();
    h.gateway.disconnect();
    h.gateway.disconnect();
    assert_eq!(h.settle().await, None);
    assert_eq!(h.gateway.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_server_disconnect_ends_session() {
    let mut h = GatewayHarness::new();
    let mut server = h.connector.accept_next();
    h.gateway.connect("alice").unwrap();
    server.next_emit().await;
    h.next_event().await;

    server.push(SocketPacket::Disconnect);
    assert_eq!(
        h.next_event().await,
        GatewayEvent::Disconnected { reason: Some("io server disconnect".into()) }
    );
    assert_eq!(h.gateway.state(), ConnectionState::Disconnected);

    // Free to connect again
    let _next = h.connector.accept_next();
    h.gateway.connect("alice").unwrap();
    assert_eq!(h.next_event().await, GatewayEvent::Connected);
}

#[tokio::test]
async fn test_lost_transport_reports_transport_close() {
    let mut h = GatewayHarness::new();
    let mut server = h.connector.accept_next();
    h.gateway.connect("alice").unwrap();
    server.next_emit().await;
    h.next_event().await;

    drop(server);
    assert_eq!(
        h.next_event().await,
        GatewayEvent::Disconnected { reason: Some("transport close".into()) }
    );
}

#[tokio::test]
async fn test_refused_connection_reports_connect_error() {
    let mut h = GatewayHarness::new();
    h.connector.refuse_next("namespace rejected");

    h.gateway.connect("alice").unwrap();
    match h.next_event().await {
        GatewayEvent::ConnectError { reason } => assert!(reason.contains("namespace rejected")),
        other => panic!("expected connect error, got {:?}", other),
    }
    assert_eq!(h.gateway.state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_connect_timeout() {
    let mut h = GatewayHarness::with_timeout(Duration::from_secs(1));
    h.connector.hang_next();

    h.gateway.connect("alice").unwrap();
    assert_eq!(h.next_event().await, GatewayEvent::ConnectTimeout);
    assert_eq!(h.gateway.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_disconnect_cancels_pending_connect() {
    let mut h = GatewayHarness::new();
    h.connector.hang_next();

    h.gateway.connect("alice").unwrap();
    assert_eq!(h.settle().await, None);
    h.gateway.disconnect();
    assert_eq!(h.settle().await, None);
    assert_eq!(h.gateway.state(), ConnectionState::Disconnected);

    let mut server = h.connector.accept_next();
    h.gateway.connect("bob").unwrap();
    assert_eq!(server.next_emit().await.1, vec![json!("bob")]);
    assert_eq!(h.next_event().await, GatewayEvent::Connected);
}

#[tokio::test]
async fn test_superseded_session_stays_silent() {
    let mut h = GatewayHarness::new();
    let mut stale = h.connector.accept_next();
    h.gateway.connect("alice").unwrap();
    stale.next_emit().await;
    assert_eq!(h.next_event().await, GatewayEvent::Connected);

    h.gateway.disconnect();
    h.next_event().await;

    let mut server = h.connector.accept_next();
    h.gateway.connect("bob").unwrap();
    server.next_emit().await;
    assert_eq!(h.next_event().await, GatewayEvent::Connected);

    stale.emit("new message", json!({"username": "ghost", "message": "boo"}));
    stale.push(SocketPacket::Disconnect);
    assert_eq!(h.settle().await, None);
    assert_eq!(h.gateway.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_immediate_disconnect_never_dials() {
    let mut h = GatewayHarness::new();
    h.connector.hang_next();

    h.gateway.connect("alice").unwrap();
    h.gateway.disconnect();
    assert_eq!(h.settle().await, None);
    assert_eq!(h.connector.attempts(), 0);
}

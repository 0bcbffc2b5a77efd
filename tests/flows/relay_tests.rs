//! Event relay tests against a live gateway.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::mpsc;

use chat_client::application::services::EventRelay;
use chat_client::domain::{ChatGateway, ConnectionState, GatewayEvent};
use chat_client::infrastructure::socket::ConnectionGateway;

use crate::common::{ScriptedConnector, CONNECT_TIMEOUT, ENDPOINT};

fn relay() -> (Arc<EventRelay<ConnectionGateway<ScriptedConnector>>>, ScriptedConnector) {
    let connector = ScriptedConnector::default();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let gateway = Arc::new(ConnectionGateway::new(
        connector.clone(),
        ENDPOINT,
        CONNECT_TIMEOUT,
        events_tx,
    ));
    (Arc::new(EventRelay::start(gateway, events_rx)), connector)
}

#[tokio::test]
async fn test_resubscribe_moves_events_to_new_listener() {
    let (relay, connector) = relay();
    let mut server = connector.accept_next();
    let mut first = relay.subscribe();

    relay.connect("alice").unwrap();
    server.next_emit().await;
    assert_eq!(first.recv().await, Some(GatewayEvent::Connected));

    let mut second = relay.subscribe();
    server.emit("user joined", json!({"username": "bob", "numUsers": 2}));
    assert_eq!(
        second.recv().await,
        Some(GatewayEvent::UserJoined { author: "bob".into(), count: 2 })
    );
    assert_eq!(first.recv().await, None);
}

#[tokio::test]
async fn test_events_before_subscription_are_not_replayed() {
    let (relay, connector) = relay();
    let mut server = connector.accept_next();

    relay.connect("alice").unwrap();
    server.next_emit().await;
    server.emit("typing", json!({"username": "bob"}));
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }

    let mut subscription = relay.subscribe();
    server.emit("stop typing", json!({"username": "bob"}));
    assert_eq!(
        subscription.recv().await,
        Some(GatewayEvent::TypingStopped { author: "bob".into() })
    );
    assert_eq!(relay.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_commands_reach_the_wire() {
    let (relay, connector) = relay();
    let mut server = connector.accept_next();
    let mut subscription = relay.subscribe();

    relay.connect("alice").unwrap();
    server.next_emit().await;
    subscription.recv().await;

    relay.send("hi").unwrap();
    relay.start_typing().unwrap();
    assert_eq!(server.next_emit().await, ("new message".to_string(), vec![json!("hi")]));
    assert_eq!(server.next_emit().await.0, "typing");

    relay.disconnect();
    assert_eq!(
        subscription.recv().await,
        Some(GatewayEvent::Disconnected { reason: Some("io client disconnect".into()) })
    );
}

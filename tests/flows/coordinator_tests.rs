//! Chat coordinator driven end to end through relay and gateway.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::Instant;

use chat_client::application::ConnectionStatus;
use chat_client::domain::{ChatGateway, ChatMessage, ConnectionState};
use chat_client::infrastructure::socket::codec::SocketPacket;
use chat_client::shared::error::SendError;

use crate::common::{ChatStack, Seen, TYPING_TIMEOUT};

async fn connected(name: &str) -> (ChatStack, crate::common::ServerHandle) {
    let (stack, mut server) = ChatStack::start(name);
    assert_eq!(server.next_emit().await, ("add user".to_string(), vec![json!(name)]));
    stack
        .view
        .wait_for_entry(Seen::Status(ConnectionStatus::Connected, None))
        .await;
    (stack, server)
}

#[tokio::test]
async fn test_received_message_reaches_view_unmodified() {
    let (stack, server) = connected("carol").await;

    server.emit("new message", json!({"username": "bob", "message": "hi"}));
    stack
        .view
        .wait_for_entry(Seen::Appended(ChatMessage::received("bob", "hi")))
        .await;

    stack.stop().await;
}

#[tokio::test]
async fn test_sent_message_is_appended_and_emitted() {
    let (stack, mut server) = connected("carol").await;

    stack.handle.send_message("hello").unwrap();
    assert_eq!(server.next_emit().await, ("new message".to_string(), vec![json!("hello")]));

    let appended: Vec<_> = stack
        .view
        .seen()
        .into_iter()
        .filter(|s| matches!(s, Seen::Appended(_)))
        .collect();
    assert_eq!(appended, vec![Seen::Appended(ChatMessage::sent("carol", "hello"))]);

    stack.stop().await;
}

#[tokio::test]
async fn test_send_after_server_disconnect_is_reported() {
    let (stack, server) = connected("carol").await;

    server.push(SocketPacket::Disconnect);
    stack
        .view
        .wait_for_entry(Seen::Status(
            ConnectionStatus::Disconnected,
            Some("io server disconnect".into()),
        ))
        .await;

    stack.handle.send_message("anyone?").unwrap();
    stack
        .view
        .wait_for_entry(Seen::SendFailed("anyone?".into(), SendError::NotConnected))
        .await;
    // Still on screen
    assert!(stack
        .view
        .seen()
        .contains(&Seen::Appended(ChatMessage::sent("carol", "anyone?"))));

    stack.stop().await;
}

#[tokio::test]
async fn test_change_identity_reconnects_under_new_name() {
    let (stack, old_server) = connected("carol").await;
    let mut new_server = stack.connector.accept_next();

    stack.handle.change_identity("alice").unwrap();
    assert_eq!(
        new_server.next_emit().await,
        ("add user".to_string(), vec![json!("alice")])
    );

    stack
        .view
        .wait_for("second connect", |seen| {
            seen.iter()
                .filter(|s| **s == Seen::Status(ConnectionStatus::Connected, None))
                .count()
                == 2
        })
        .await;
    let seen = stack.view.seen();
    assert!(seen.contains(&Seen::IdentityChanged("alice".into())));
    assert!(seen.contains(&Seen::Status(
        ConnectionStatus::Disconnected,
        Some("io client disconnect".into())
    )));
    assert!(old_server.is_closed());
    assert_eq!(stack.relay.state(), ConnectionState::Connected);

    stack.handle.send_message("it's me").unwrap();
    new_server.next_emit().await;
    stack
        .view
        .wait_for_entry(Seen::Appended(ChatMessage::sent("alice", "it's me")))
        .await;

    stack.stop().await;
}

#[tokio::test]
async fn test_refused_reconnect_surfaces_connect_error() {
    let (stack, _server) = connected("carol").await;
    stack.connector.refuse_next("server full");

    stack.handle.change_identity("alice").unwrap();
    stack
        .view
        .wait_for("connect error", |seen| {
            seen.iter()
                .any(|s| matches!(s, Seen::Status(ConnectionStatus::ConnectError, Some(_))))
        })
        .await;
    assert_eq!(stack.relay.state(), ConnectionState::Disconnected);

    stack.stop().await;
}

#[tokio::test]
async fn test_empty_identity_is_ignored() {
    let (stack, _server) = connected("carol").await;

    stack.handle.change_identity("   ").unwrap();
    stack.handle.send_message("still carol").unwrap();
    stack
        .view
        .wait_for_entry(Seen::Appended(ChatMessage::sent("carol", "still carol")))
        .await;
    assert_eq!(stack.connector.attempts(), 1);
    assert_eq!(stack.relay.state(), ConnectionState::Connected);

    stack.stop().await;
}

#[tokio::test]
async fn test_malformed_payload_has_no_visible_effect() {
    let (stack, server) = connected("carol").await;
    let before = stack.view.seen().len();

    server.emit("new message", json!({"message": "who said this"}));
    server.emit("user joined", json!({"username": "dave", "numUsers": 3}));
    stack
        .view
        .wait_for_entry(Seen::Joined("dave".into(), 3))
        .await;

    assert_eq!(stack.view.seen().len(), before + 1);

    stack.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_sends_one_start_and_one_stop() {
    let (stack, mut server) = connected("carol").await;

    let mut last_keystroke = Instant::now();
    for _ in 0..4 {
        stack.handle.notify_keystroke().unwrap();
        last_keystroke = Instant::now();
        tokio::time::sleep(Duration::from_millis(1000)).await;
    }

    assert_eq!(server.next_emit().await.0, "typing");
    assert!(server.drain().is_empty());

    assert_eq!(server.next_emit().await.0, "stop typing");
    let elapsed = Instant::now() - last_keystroke;
    assert!(elapsed >= TYPING_TIMEOUT, "stopped after {:?}", elapsed);
    assert!(elapsed < TYPING_TIMEOUT + Duration::from_millis(100), "stopped after {:?}", elapsed);

    stack.stop().await;
}

#[tokio::test]
async fn test_remote_typing_and_presence_notifications() {
    let (stack, server) = connected("carol").await;

    server.emit("user joined", json!({"username": "bob", "numUsers": 2}));
    server.emit("typing", json!({"username": "bob"}));
    server.emit("stop typing", json!({"username": "bob"}));
    server.emit("user left", json!({"username": "bob", "numUsers": 1}));
    stack.view.wait_for_entry(Seen::Left("bob".into(), 1)).await;

    let tail: Vec<_> = stack.view.seen().into_iter().rev().take(4).rev().collect();
    assert_eq!(
        tail,
        vec![
            Seen::Joined("bob".into(), 2),
            Seen::Typing("bob".into(), true),
            Seen::Typing("bob".into(), false),
            Seen::Left("bob".into(), 1),
        ]
    );

    stack.stop().await;
}

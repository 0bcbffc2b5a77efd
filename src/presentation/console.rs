//! Line-oriented console view.

use chrono::Local;

use crate::application::{ChatView, ConnectionStatus};
use crate::domain::{ChatMessage, Direction};
use crate::shared::error::{IdentityChangeError, SendError};

/// Prints every notification as one timestamped line on stdout.
#[derive(Debug, Default)]
pub struct ConsoleView;

impl ConsoleView {
    pub fn new() -> Self {
        Self
    }

    fn print(&self, line: &str) {
        println!("[{}] {}", Local::now().format("%H:%M:%S"), line);
    }
}

/// Render a message the way the console shows it.
pub fn format_message(message: &ChatMessage) -> String {
    match message.direction() {
        Direction::Sent => format!("<{}> {}", message.author(), message.body()),
        Direction::Received => format!("{}: {}", message.author(), message.body()),
    }
}

/// Render a connection status line.
pub fn format_status(status: ConnectionStatus, reason: Option<&str>) -> String {
    let text = match status {
        ConnectionStatus::Connected => "Connected",
        ConnectionStatus::Disconnected => "Disconnected",
        ConnectionStatus::ConnectError => "Failed to connect",
        ConnectionStatus::ConnectTimeout => "Connection timed out",
    };
    match reason {
        Some(reason) => format!("* {} ({})", text, reason),
        None => format!("* {}", text),
    }
}

fn participants(count: u64) -> String {
    if count == 1 {
        "there's 1 participant".to_string()
    } else {
        format!("there are {} participants", count)
    }
}

impl ChatView for ConsoleView {
    fn on_message_appended(&self, message: &ChatMessage) {
        self.print(&format_message(message));
    }

    fn on_user_joined(&self, name: &str, count: u64) {
        self.print(&format!("* {} joined, {}", name, participants(count)));
    }

    fn on_user_left(&self, name: &str, count: u64) {
        self.print(&format!("* {} left, {}", name, participants(count)));
    }

    fn on_typing_indicator_changed(&self, name: &str, is_typing: bool) {
        if is_typing {
            self.print(&format!("* {} is typing", name));
        } else {
            self.print(&format!("* {} stopped typing", name));
        }
    }

    fn on_connection_status(&self, status: ConnectionStatus, reason: Option<&str>) {
        self.print(&format_status(status, reason));
    }

    fn on_identity_changed(&self, name: &str) {
        self.print(&format!("* You are now known as {}", name));
    }

    fn on_send_failed(&self, message: &ChatMessage, error: &SendError) {
        self.print(&format!("! Not delivered: \"{}\" ({})", message.body(), error));
    }

    fn on_identity_change_failed(&self, error: &IdentityChangeError) {
        self.print(&format!("! {}", error));
    }
}

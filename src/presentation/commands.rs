//! Console input parsing.
//!
//! Lines starting with `/` are commands; anything else is a chat message.

/// Parsed line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send a chat message.
    Message {
        /// Message content, trimmed.
        content: String,
    },

    /// Change the display name.
    Nick {
        /// Requested name.
        name: String,
    },

    /// Quit the application.
    Quit,

    /// Unknown command.
    Unknown {
        /// The original input.
        input: String,
    },

    /// Command with missing or invalid arguments.
    InvalidArgs {
        /// Command name.
        command: String,
        /// Error message.
        error: String,
    },
}

/// Parse one console line.
pub fn parse(input: &str) -> Command {
    let input = input.trim();

    let Some(cmd_str) = input.strip_prefix('/') else {
        return Command::Message { content: input.to_string() };
    };

    let (command, rest) = match cmd_str.trim_start().split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (cmd_str.trim_start(), ""),
    };

    match command {
        "nick" | "name" => {
            if rest.is_empty() {
                Command::InvalidArgs {
                    command: command.into(),
                    error: "Usage: /nick <name>".into(),
                }
            } else {
                Command::Nick { name: rest.to_string() }
            }
        }

        "quit" | "q" => Command::Quit,

        _ => Command::Unknown { input: input.to_string() },
    }
}

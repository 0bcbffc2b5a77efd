//! Presentation Layer
//!
//! A thin console surface: input parsing and a `ChatView` that prints.

pub mod commands;
pub mod console;

pub use commands::{parse, Command};
pub use console::ConsoleView;

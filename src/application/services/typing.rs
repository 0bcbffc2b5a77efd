//! Typing indicator debounce state.
//!
//! A burst of keystrokes produces one start signal and, once input stops for
//! the full window, one stop signal. Every keystroke bumps a generation
//! counter; a scheduled deadline only counts if it carries the latest one.

use std::time::Duration;

use tokio::time::Instant;

/// Default quiet period after which typing is considered stopped.
pub const DEFAULT_TYPING_TIMEOUT: Duration = Duration::from_millis(3000);

/// Identifies one scheduled deadline check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingTicket {
    pub generation: u64,
    pub deadline: Instant,
}

/// Result of registering a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keystroke {
    /// True on the idle-to-typing transition; the caller announces it.
    pub started: bool,
    /// Deadline check to schedule, superseding any earlier one.
    pub ticket: TypingTicket,
}

#[derive(Debug, Clone)]
pub struct TypingState {
    is_typing: bool,
    deadline: Option<Instant>,
    generation: u64,
    window: Duration,
}

impl TypingState {
    pub fn new(window: Duration) -> Self {
        Self {
            is_typing: false,
            deadline: None,
            generation: 0,
            window,
        }
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn keystroke(&mut self, now: Instant) -> Keystroke {
        let started = !self.is_typing;
        self.is_typing = true;
        self.generation += 1;
        let deadline = now + self.window;
        self.deadline = Some(deadline);

        Keystroke {
            started,
            ticket: TypingTicket {
                generation: self.generation,
                deadline,
            },
        }
    }

    /// A scheduled deadline fired. Returns true when typing should stop now.
    pub fn expire(&mut self, ticket: TypingTicket) -> bool {
        if !self.is_typing || ticket.generation != self.generation {
            return false;
        }
        self.is_typing = false;
        self.deadline = None;
        true
    }

    /// Explicit stop. Returns true if the user was typing.
    ///
    /// Outstanding tickets are invalidated either way.
    pub fn stop(&mut self) -> bool {
        let was_typing = self.is_typing;
        self.is_typing = false;
        self.deadline = None;
        self.generation += 1;
        was_typing
    }
}

impl Default for TypingState {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_TIMEOUT)
    }
}

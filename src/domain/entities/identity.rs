//! Identity entity.
//!
//! The display name attached to presence announcements and outbound messages.
//! One instance lives for the whole process; it is owned by the chat
//! coordinator and only replaced through an identity change.

use uuid::Uuid;

/// Suffix appended to generated names when no configuration overrides it.
pub const DEFAULT_NAME_SUFFIX: &str = "_User";

/// Length of the random prefix taken from a v4 UUID.
const GENERATED_PREFIX_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    name: String,
    user_chosen: bool,
}

impl Identity {
    /// Generate a pseudo-random placeholder name such as `3f2a1_User`.
    pub fn generate(suffix: &str) -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self {
            name: format!("{}{}", &uuid[..GENERATED_PREFIX_LEN], suffix),
            user_chosen: false,
        }
    }

    /// Identity explicitly chosen by the user.
    pub fn chosen(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_chosen: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the user has replaced the generated placeholder.
    pub fn is_user_chosen(&self) -> bool {
        self.user_chosen
    }

    /// Overwrite the name. The identity is never cleared.
    pub fn set(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.user_chosen = true;
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

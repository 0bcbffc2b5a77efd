//! Validation Utilities
//!
//! Synchronous checks run at the coordinator boundary; rejected input never
//! reaches the network.

use validator::{Validate, ValidationErrors};

/// Maximum display name length accepted by the chat server UI.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 64;

/// Display name submitted by the user.
#[derive(Debug, Validate)]
struct DisplayNameInput {
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters"))]
    name: String,
}

/// Outbound message body submitted by the user.
#[derive(Debug, Validate)]
struct MessageBodyInput {
    #[validate(length(min = 1, message = "must not be empty"))]
    body: String,
}

/// Flatten validation errors into a single `field: message` line.
pub fn describe(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e.message.clone().map(|m| m.to_string()).unwrap_or_default();
                format!("{}: {}", field, message)
            })
        })
        .next()
        .unwrap_or_else(|| "Validation failed".into())
}

/// Trim and validate a display name, returning the trimmed value.
pub fn validate_display_name(raw: &str) -> Result<String, String> {
    let input = DisplayNameInput {
        name: raw.trim().to_string(),
    };
    input.validate().map_err(|e| describe(&e))?;
    Ok(input.name)
}

/// Trim and validate a message body, returning the trimmed value.
pub fn validate_message_body(raw: &str) -> Result<String, String> {
    let input = MessageBodyInput {
        body: raw.trim().to_string(),
    };
    input.validate().map_err(|e| describe(&e))?;
    Ok(input.body)
}

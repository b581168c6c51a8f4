//! Inbound chat payload contract
//!
//! The proxy accepts `{ "messages": Turn[] }`. Rules are checked in a fixed
//! order and the first violation wins:
//!
//! 1. `messages` is an array
//! 2. the array is non-empty
//! 3. every element is an object with string `role` and `content`
//! 4. every `role` is exactly `user` or `assistant`
//! 5. the last element is a `user` turn
//!
//! Rules 3 and 4 are applied element by element in index order.

use crate::turn::{Role, Turn};
use serde_json::Value;
use thiserror::Error;

/// A violated payload rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Messages should be an array.")]
    NotArray,

    #[error("Messages array cannot be empty.")]
    Empty,

    #[error("Message at index {index} is invalid.")]
    InvalidMessage { index: usize },

    #[error("Message at index {index} must have 'role' and 'content' as strings.")]
    FieldsNotStrings { index: usize },

    #[error("Message at index {index} has an invalid role '{role}'.")]
    InvalidRole { index: usize, role: String },

    #[error("The last message must be from the user.")]
    LastNotUser,
}

impl ValidationError {
    /// Stable machine-readable code for the violated rule.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NotArray => "messages_not_array",
            ValidationError::Empty => "messages_empty",
            ValidationError::InvalidMessage { .. } => "message_invalid",
            ValidationError::FieldsNotStrings { .. } => "message_fields_not_strings",
            ValidationError::InvalidRole { .. } => "message_invalid_role",
            ValidationError::LastNotUser => "last_message_not_user",
        }
    }
}

/// Validate a whole request body. A body that is not an object, or an object
/// without `messages`, fails rule 1.
pub fn validate_request(body: &Value) -> Result<Vec<Turn>, ValidationError> {
    validate_messages(body.get("messages"))
}

/// Validate the `messages` member and convert it into typed turns.
pub fn validate_messages(messages: Option<&Value>) -> Result<Vec<Turn>, ValidationError> {
    let items = messages
        .and_then(Value::as_array)
        .ok_or(ValidationError::NotArray)?;

    if items.is_empty() {
        return Err(ValidationError::Empty);
    }

    let mut turns = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        turns.push(validate_turn(index, item)?);
    }

    match turns.last() {
        Some(last) if last.role == Role::User => Ok(turns),
        _ => Err(ValidationError::LastNotUser),
    }
}

fn validate_turn(index: usize, item: &Value) -> Result<Turn, ValidationError> {
    let object = item
        .as_object()
        .ok_or(ValidationError::InvalidMessage { index })?;

    let (Some(role), Some(content)) = (
        object.get("role").and_then(Value::as_str),
        object.get("content").and_then(Value::as_str),
    ) else {
        return Err(ValidationError::FieldsNotStrings { index });
    };

    let role = Role::parse(role).ok_or_else(|| ValidationError::InvalidRole {
        index,
        role: role.to_string(),
    })?;

    Ok(Turn {
        role,
        content: content.to_string(),
    })
}

//! Conversation model
//!
//! A [`Turn`] is what travels over the wire. A [`DisplayTurn`] is the
//! client's presentation copy of a turn and never leaves the process.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Exact, case-sensitive match against the wire names.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A turn plus the client-only presentation flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTurn {
    pub role: Role,
    pub content: String,
    /// Play the entrance transition when first drawn
    pub animated: bool,
    /// Draw the typing placeholder instead of the content
    pub is_typing: bool,
}

impl DisplayTurn {
    pub fn new(role: Role, content: impl Into<String>, animated: bool) -> Self {
        Self {
            role,
            content: content.into(),
            animated,
            is_typing: false,
        }
    }

    /// The "assistant is thinking" placeholder turn.
    pub fn typing_placeholder() -> Self {
        Self {
            role: Role::Assistant,
            content: "...".to_string(),
            animated: true,
            is_typing: true,
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    pub fn to_turn(&self) -> Turn {
        Turn {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

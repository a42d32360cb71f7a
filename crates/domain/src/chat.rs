//! Chat transcript and caller identity types.

use nightschool_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Caller key shared by every request that carries no address header.
pub const UNKNOWN_CALLER: &str = "unknown";

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Message typed by the signed-in user.
    User,
    /// Reply produced by the assistant, or an error surfaced in its place.
    Assistant,
}

impl ChatRole {
    /// Returns the stable wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Single entry in a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: ChatRole,
    content: String,
}

impl ChatMessage {
    /// Creates a message authored by the user.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates a message authored by the assistant.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    /// Returns the message author.
    #[must_use]
    pub fn role(&self) -> ChatRole {
        self.role
    }

    /// Returns the message text.
    #[must_use]
    pub fn content(&self) -> &str {
        self.content.as_str()
    }
}

/// Identifier used to bucket rate-limit state, derived from the caller address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerKey(String);

impl CallerKey {
    /// Creates a caller key from a non-blank identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let value = NonEmptyString::new(value.trim())?;
        Ok(Self(value.into()))
    }

    /// Returns the shared placeholder key for unidentifiable callers.
    #[must_use]
    pub fn unknown() -> Self {
        Self(UNKNOWN_CALLER.to_owned())
    }

    /// Returns true when this key is the shared placeholder bucket.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.as_str() == UNKNOWN_CALLER
    }

    /// Returns the underlying key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CallerKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

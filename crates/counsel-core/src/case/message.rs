//! Conversation message types.
//!
//! This module contains types for representing messages in the case
//! conversation, including roles and file references.

use serde::{Deserialize, Serialize};

/// Represents the role of a message in the case conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from an agent (master agent or system).
    Assistant,
}

/// Reference to a staged file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Backend-assigned file identifier.
    pub id: String,
    /// Original filename, for display.
    pub name: String,
}

/// A single message in the case conversation.
///
/// Messages are immutable once created and form an append-only sequence;
/// insertion order is chronological display order. The `id` and `timestamp`
/// are assigned by the store at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Store-assigned identifier (wall-clock millis; collisions are a
    /// display-order detail, not a correctness requirement).
    pub id: i64,
    /// The role of the message sender.
    pub role: MessageRole,
    /// Named sender for assistant messages (e.g. "Master Agent", "System").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// The content of the message.
    pub content: String,
    /// Files attached to the message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileRef>,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
}

/// Input for [`CaseStore::add_message`](crate::case::CaseStore::add_message):
/// a message without the store-assigned `id` and `timestamp`.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDraft {
    pub role: MessageRole,
    pub agent: Option<String>,
    pub content: String,
    pub files: Vec<FileRef>,
}

impl MessageDraft {
    /// Creates a user message draft with the given attachments.
    pub fn user(content: impl Into<String>, files: Vec<FileRef>) -> Self {
        Self {
            role: MessageRole::User,
            agent: None,
            content: content.into(),
            files,
        }
    }

    /// Creates an assistant message draft attributed to a named sender.
    pub fn assistant(agent: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            agent: Some(agent.into()),
            content: content.into(),
            files: Vec::new(),
        }
    }
}

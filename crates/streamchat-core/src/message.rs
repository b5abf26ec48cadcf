//! View item types.

use serde::{Deserialize, Serialize};

/// Who a view item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// Text typed by the local user.
    User,
    /// Text produced by the server.
    Assistant,
    /// Notices generated by the client itself.
    System,
}

impl Sender {
    /// Name used as the CSS class of the rendered item.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// Whether a message may still change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    /// The message will not change again.
    #[default]
    Final,
    /// The message is still receiving streamed updates and shows a cursor.
    InProgress,
}

/// A message as handed to the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who the message belongs to.
    pub sender: Sender,
    /// Message text, possibly markdown.
    pub content: String,
    /// Whether more updates are expected.
    pub completeness: Completeness,
}

impl Message {
    /// Create a final user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::finished(Sender::User, content)
    }

    /// Create a final assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::finished(Sender::Assistant, content)
    }

    /// Create an in-progress assistant message.
    #[must_use]
    pub fn streaming(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            content: content.into(),
            completeness: Completeness::InProgress,
        }
    }

    /// Create a system notice.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::finished(Sender::System, content)
    }

    fn finished(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            sender,
            content: content.into(),
            completeness: Completeness::Final,
        }
    }

    /// Check if the message is still receiving updates.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.completeness == Completeness::InProgress
    }
}

/// Handle to an item appended to a view.
///
/// Views hand these out in append order; the controller keeps them to update
/// or remove items later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

//! Domain models for remote chat data.
//!
//! These mirror the records returned by the provider. The client only keeps
//! transient copies for the duration of one command.

use serde::{Deserialize, Serialize};

/// Separator between a parent project name and a submodule suffix.
pub const SUBMODULE_MARKER: &str = "-SubModule-";

/// Project reference embedded in a chat record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatProject {
    /// Project identifier.
    pub uuid: String,
    /// Project display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A remote chat conversation (summary record, no messages).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Stable identifier.
    pub uuid: String,
    /// Display name, if the provider has one.
    #[serde(default)]
    pub name: Option<String>,
    /// Associated project, if any.
    #[serde(default)]
    pub project: Option<ChatProject>,
    /// Last update timestamp as sent by the provider.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Chat {
    /// Name to show to the operator.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed")
    }

    /// Project identifier, if the chat belongs to one.
    #[must_use]
    pub fn project_uuid(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.uuid.as_str())
    }

    /// Project name, if the chat belongs to a named project.
    #[must_use]
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().and_then(|p| p.name.as_deref())
    }

    /// Update timestamp, or `Unknown`.
    #[must_use]
    pub fn updated_display(&self) -> &str {
        self.updated_at.as_deref().unwrap_or("Unknown")
    }
}

/// A remote project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project identifier.
    #[serde(alias = "uuid")]
    pub id: String,
    /// Project name.
    pub name: String,
    /// Archive timestamp; `None` for live projects.
    #[serde(default)]
    pub archived_at: Option<String>,
}

impl Project {
    /// Whether the project has been archived.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Whether this project is a live submodule of the project named `parent_name`.
    ///
    /// The relation is purely name based: `<parent>-SubModule-<suffix>`.
    #[must_use]
    pub fn is_submodule_of(&self, parent_name: &str) -> bool {
        !self.is_archived() && submodule_suffix(&self.name, parent_name).is_some()
    }
}

/// Strip the `<parent>-SubModule-` prefix from a project name.
#[must_use]
pub fn submodule_suffix<'a>(name: &'a str, parent_name: &str) -> Option<&'a str> {
    name.strip_prefix(parent_name)?.strip_prefix(SUBMODULE_MARKER)
}

/// A single message inside a full conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message identifier.
    pub uuid: String,
    /// `human` or `assistant`.
    #[serde(default)]
    pub sender: String,
    /// Raw message text.
    #[serde(default)]
    pub text: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ChatMessage {
    #[must_use]
    pub fn is_assistant(&self) -> bool {
        self.sender == "assistant"
    }
}

/// Full conversation including messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConversation {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub chat_messages: Vec<ChatMessage>,
}

/// An organization the session has access to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
}

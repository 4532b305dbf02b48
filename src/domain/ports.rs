//! Seams between the workflows and the outside world.
//!
//! The provider, the artifact writer and the operator are all reached
//! through these traits so the workflows can run against fakes in tests.

use std::path::Path;

use super::error::Result;
use super::models::{Chat, ChatConversation, Project};
use super::sync::{ChatScope, ProjectContext, TransferStats};

/// Remote chat provider.
pub trait ChatProvider {
    /// List every chat of an organization.
    fn list_chats(&self, organization_id: &str) -> Result<Vec<Chat>>;

    /// Fetch a full conversation including its messages.
    fn get_chat(&self, organization_id: &str, chat_uuid: &str) -> Result<ChatConversation>;

    /// Delete a batch of chats, returning the ids the provider reports as deleted.
    fn delete_chats(&self, organization_id: &str, uuids: &[String]) -> Result<Vec<String>>;

    /// Create a new chat.
    fn create_chat(
        &self,
        organization_id: &str,
        name: Option<&str>,
        project_uuid: Option<&str>,
        model: Option<&str>,
    ) -> Result<Chat>;

    /// List the projects of an organization.
    fn list_projects(&self, organization_id: &str) -> Result<Vec<Project>>;
}

/// Writes chat records and artifacts under a destination directory.
pub trait ArtifactSync {
    /// Download the chats selected by `scope` into `destination`.
    fn sync(
        &self,
        provider: &dyn ChatProvider,
        context: &ProjectContext,
        destination: &Path,
        scope: &ChatScope,
    ) -> Result<TransferStats>;
}

/// Blocking operator interaction.
pub trait Prompter {
    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Ask for a line of text. `None` means no answer is available.
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<Option<String>>;

    /// Show a message to the operator.
    fn notify(&mut self, message: &str);
}

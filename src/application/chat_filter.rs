//! Remote chat listing and project filtering.

use crate::domain::{Chat, ChatProvider, ChatScope, Result};

/// Keep the chats selected by `scope`.
///
/// In project mode chats without a project are dropped.
#[must_use]
pub fn filter_chats(chats: Vec<Chat>, scope: &ChatScope) -> Vec<Chat> {
    match scope {
        ChatScope::All => chats,
        ChatScope::Project(project_id) => chats
            .into_iter()
            .filter(|chat| chat.project_uuid() == Some(project_id.as_str()))
            .collect(),
    }
}

/// Fetch the organization's chats and apply `scope`.
///
/// An empty result is not an error.
///
/// # Errors
/// Propagates provider errors from the listing call.
pub fn list_target_chats(
    provider: &dyn ChatProvider,
    organization_id: &str,
    scope: &ChatScope,
) -> Result<Vec<Chat>> {
    let chats = provider.list_chats(organization_id)?;
    let total = chats.len();
    let targets = filter_chats(chats, scope);

    tracing::info!(
        total = total,
        targets = targets.len(),
        all = scope.is_all(),
        "Listed remote chats"
    );

    Ok(targets)
}

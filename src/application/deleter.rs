//! Chat deletion: paged delete-all and interactive delete-one.

use crate::domain::{
    AppError, Chat, ChatProvider, DeleteConfig, DeletionReport, Prompter, Result,
};

/// Outcome of the delete-all command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteAllOutcome {
    /// The operator declined.
    Cancelled,
    /// The loop ran until the listing came back empty.
    Finished(DeletionReport),
}

/// Outcome of the delete-one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOneOutcome {
    /// There was nothing to choose from.
    NoChats,
    /// The operator quit the selection or declined the confirmation.
    Cancelled,
    /// The chat was deleted.
    Deleted(Chat),
    /// The provider refused the deletion.
    Failed(Chat),
}

/// Delete one batch, turning provider errors into a failed count.
///
/// Returns `(deleted, failed)`.
pub fn delete_batch(
    provider: &dyn ChatProvider,
    organization_id: &str,
    uuids: &[String],
) -> (usize, usize) {
    match provider.delete_chats(organization_id, uuids) {
        Ok(deleted) => (deleted.len(), uuids.len().saturating_sub(deleted.len())),
        Err(e) => {
            tracing::error!(error = %e, batch = uuids.len(), "Error deleting chats");
            (0, uuids.len())
        }
    }
}

/// Deletes chats in bounded pages, re-listing after every page.
pub struct BatchDeleter<'a> {
    provider: &'a dyn ChatProvider,
    config: DeleteConfig,
}

impl<'a> BatchDeleter<'a> {
    #[must_use]
    pub fn new(provider: &'a dyn ChatProvider, config: DeleteConfig) -> Self {
        Self { provider, config }
    }

    /// Ask for confirmation, then delete every chat of the organization.
    ///
    /// # Errors
    /// Propagates listing errors and returns `DeletionStalled` when the
    /// safety bounds are hit.
    pub fn delete_all(
        &self,
        organization_id: &str,
        prompter: &mut dyn Prompter,
        mut on_page: impl FnMut(&DeletionReport),
    ) -> Result<DeleteAllOutcome> {
        if !prompter.confirm("Are you sure you want to delete all chats?", false)? {
            return Ok(DeleteAllOutcome::Cancelled);
        }

        self.run(organization_id, &mut on_page)
            .map(DeleteAllOutcome::Finished)
    }

    /// The delete loop without the confirmation.
    ///
    /// Ends when a fresh listing is empty. Gives up with `DeletionStalled`
    /// after `max_pages` rounds or `max_stalled_pages` consecutive rounds
    /// that deleted nothing.
    ///
    /// # Errors
    /// Propagates listing errors and returns `DeletionStalled`.
    pub fn run(
        &self,
        organization_id: &str,
        on_page: &mut dyn FnMut(&DeletionReport),
    ) -> Result<DeletionReport> {
        let batch_size = self.config.batch_size.max(1);
        let max_pages = self.config.max_pages.max(1);
        let max_stalled_pages = self.config.max_stalled_pages.max(1);
        let mut report = DeletionReport::default();
        let mut stalled = 0usize;

        loop {
            let chats = self.provider.list_chats(organization_id)?;
            if chats.is_empty() {
                break;
            }

            if report.pages >= max_pages || stalled >= max_stalled_pages {
                tracing::warn!(
                    pages = report.pages,
                    remaining = chats.len(),
                    "Chat deletion is not making progress"
                );
                return Err(AppError::DeletionStalled {
                    deleted: report.deleted,
                    failed: report.failed,
                    pages: report.pages,
                });
            }

            let uuids: Vec<String> = chats
                .iter()
                .take(batch_size)
                .map(|c| c.uuid.clone())
                .collect();

            let (deleted, failed) = delete_batch(self.provider, organization_id, &uuids);
            report.deleted += deleted;
            report.failed += failed;
            report.pages += 1;
            stalled = if deleted == 0 { stalled + 1 } else { 0 };

            tracing::debug!(page = report.pages, deleted, failed, "Deleted chat batch");
            on_page(&report);
        }

        tracing::info!(
            deleted = report.deleted,
            failed = report.failed,
            pages = report.pages,
            "Chat deletion complete"
        );

        Ok(report)
    }

    /// List chats, let the operator pick one and delete it after confirmation.
    ///
    /// # Errors
    /// Propagates listing and prompt errors.
    pub fn delete_one(
        &self,
        organization_id: &str,
        prompter: &mut dyn Prompter,
        show_list: impl FnOnce(&[Chat]),
    ) -> Result<DeleteOneOutcome> {
        let chats = self.provider.list_chats(organization_id)?;
        if chats.is_empty() {
            return Ok(DeleteOneOutcome::NoChats);
        }

        show_list(&chats);

        let Some(chat) = select_chat(&chats, prompter)? else {
            return Ok(DeleteOneOutcome::Cancelled);
        };

        let question = format!(
            "Are you sure you want to delete the chat '{}'?",
            chat.display_name()
        );
        if !prompter.confirm(&question, false)? {
            return Ok(DeleteOneOutcome::Cancelled);
        }

        let (deleted, _) = delete_batch(self.provider, organization_id, &[chat.uuid.clone()]);
        if deleted > 0 {
            Ok(DeleteOneOutcome::Deleted(chat.clone()))
        } else {
            Ok(DeleteOneOutcome::Failed(chat.clone()))
        }
    }
}

/// Prompt for a 1-based chat number until a valid one or `q` is entered.
///
/// Returns `None` when the operator quits or no answer is available.
///
/// # Errors
/// Propagates prompt errors.
pub fn select_chat<'c>(chats: &'c [Chat], prompter: &mut dyn Prompter) -> Result<Option<&'c Chat>> {
    loop {
        let Some(answer) = prompter.input(
            "Enter the number of the chat to delete (or 'q' to quit)",
            None,
        )?
        else {
            return Ok(None);
        };

        let answer = answer.trim();
        if answer.eq_ignore_ascii_case("q") {
            return Ok(None);
        }

        match answer.parse::<usize>() {
            Ok(n) if (1..=chats.len()).contains(&n) => return Ok(Some(&chats[n - 1])),
            Ok(_) => prompter.notify("Invalid selection. Please try again."),
            Err(_) => prompter.notify("Invalid input. Please enter a number or 'q' to quit."),
        }
    }
}

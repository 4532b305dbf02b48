//! The `chat pull` workflow.
//!
//! Planning (context, local scan, remote listing) is separated from
//! execution (dry-run gate, confirmation, backup, transfer) so the preview
//! can be shown between the two. Every branch ends in an explicit
//! [`PullOutcome`].

use std::path::PathBuf;

use chrono::Utc;

use crate::domain::{
    ArtifactSync, Chat, ChatProvider, ChatScope, ProjectContext, Prompter, PullOptions, Result,
    TransferStats,
};

use super::backup::create_backup;
use super::chat_filter::list_target_chats;
use super::inventory::scan_existing;

/// Number of chats and files listed in previews.
pub const PREVIEW_LIMIT: usize = 10;

/// What a pull would do, computed before anything is touched.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// Directory receiving the chats.
    pub destination: PathBuf,
    /// Chat selection in effect.
    pub scope: ChatScope,
    /// Remote chats selected for download.
    pub targets: Vec<Chat>,
    /// Chat files already present, relative to `destination`.
    pub existing_files: Vec<PathBuf>,
}

impl SyncPlan {
    #[must_use]
    pub fn has_targets(&self) -> bool {
        !self.targets.is_empty()
    }

    #[must_use]
    pub fn has_existing_files(&self) -> bool {
        !self.existing_files.is_empty()
    }

    /// First chats to show in the preview.
    #[must_use]
    pub fn preview_chats(&self) -> &[Chat] {
        &self.targets[..self.targets.len().min(PREVIEW_LIMIT)]
    }

    /// Chats not shown by [`Self::preview_chats`].
    #[must_use]
    pub fn hidden_chat_count(&self) -> usize {
        self.targets.len().saturating_sub(PREVIEW_LIMIT)
    }

    /// First existing files to show in the preview.
    #[must_use]
    pub fn sample_existing(&self) -> &[PathBuf] {
        &self.existing_files[..self.existing_files.len().min(PREVIEW_LIMIT)]
    }

    /// Existing files not shown by [`Self::sample_existing`].
    #[must_use]
    pub fn hidden_file_count(&self) -> usize {
        self.existing_files.len().saturating_sub(PREVIEW_LIMIT)
    }
}

/// Result of a completed pull.
#[derive(Debug, Clone)]
pub struct PullSummary {
    pub destination: PathBuf,
    /// Set only when a backup was actually written.
    pub backup: Option<PathBuf>,
    pub stats: TransferStats,
    /// Existing files were overwritten without a backup being requested.
    pub suggest_backup: bool,
}

/// How a pull ended.
#[derive(Debug, Clone)]
pub enum PullOutcome {
    /// The remote side had no matching chats.
    NothingToSync,
    /// Dry run: nothing was changed.
    DryRun {
        destination: PathBuf,
        would_download: usize,
        would_overwrite: usize,
    },
    /// The operator declined the download.
    Cancelled,
    /// The backup failed and the operator chose not to continue.
    BackupAborted { reason: String },
    /// Chats were transferred.
    Completed(PullSummary),
}

/// Runs the pull workflow against a provider and an artifact writer.
pub struct PullService<'a> {
    provider: &'a dyn ChatProvider,
    transfer: &'a dyn ArtifactSync,
    clock: fn() -> i64,
}

impl<'a> PullService<'a> {
    /// Create a pull service using the system clock for backup names.
    #[must_use]
    pub fn new(provider: &'a dyn ChatProvider, transfer: &'a dyn ArtifactSync) -> Self {
        Self {
            provider,
            transfer,
            clock: unix_now,
        }
    }

    /// Replace the clock used for backup timestamps.
    #[cfg(test)]
    #[must_use]
    pub const fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Resolve the context, scan the destination and list remote targets.
    ///
    /// Read-only: nothing on disk or on the provider is modified.
    ///
    /// # Errors
    /// Returns `Config` when organization, project or local path is missing,
    /// and propagates listing errors.
    pub fn plan(&self, context: &ProjectContext, options: &PullOptions) -> Result<SyncPlan> {
        // The project is needed for addressing even when --all bypasses filtering.
        let organization_id = context.require_organization()?;
        context.require_project()?;
        let destination = context.chat_destination()?;

        let existing_files = scan_existing(&destination)?;
        let scope = ChatScope::for_context(context, options.sync_all)?;
        let targets = list_target_chats(self.provider, organization_id, &scope)?;

        Ok(SyncPlan {
            destination,
            scope,
            targets,
            existing_files,
        })
    }

    /// Carry out a plan.
    ///
    /// # Errors
    /// Propagates prompt failures and transfer errors.
    pub fn execute(
        &self,
        context: &ProjectContext,
        plan: &SyncPlan,
        options: &PullOptions,
        prompter: &mut dyn Prompter,
    ) -> Result<PullOutcome> {
        if !plan.has_targets() {
            return Ok(PullOutcome::NothingToSync);
        }

        if options.dry_run {
            return Ok(PullOutcome::DryRun {
                destination: plan.destination.clone(),
                would_download: plan.targets.len(),
                would_overwrite: plan.existing_files.len(),
            });
        }

        if !options.force && !self.confirm_download(plan, options, prompter)? {
            return Ok(PullOutcome::Cancelled);
        }

        let backup = if options.backup_existing && plan.has_existing_files() {
            match create_backup(&plan.destination, (self.clock)()) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::error!(error = %e, "Backup failed");
                    prompter.notify(&format!("Backup failed: {e}"));
                    if !prompter.confirm("Continue without backup?", false)? {
                        return Ok(PullOutcome::BackupAborted {
                            reason: e.to_string(),
                        });
                    }
                    None
                }
            }
        } else {
            None
        };

        tracing::info!(
            chats = plan.targets.len(),
            destination = %plan.destination.display(),
            "Starting chat transfer"
        );
        let stats = self
            .transfer
            .sync(self.provider, context, &plan.destination, &plan.scope)?;

        Ok(PullOutcome::Completed(PullSummary {
            destination: plan.destination.clone(),
            backup,
            stats,
            suggest_backup: plan.has_existing_files() && !options.backup_existing,
        }))
    }

    fn confirm_download(
        &self,
        plan: &SyncPlan,
        options: &PullOptions,
        prompter: &mut dyn Prompter,
    ) -> Result<bool> {
        if plan.has_existing_files() && !options.backup_existing {
            prompter.notify(&format!(
                "This will potentially overwrite {} existing files!",
                plan.existing_files.len()
            ));
            prompter.notify("Consider using --backup-existing to protect your data");
        }

        prompter.confirm(
            &format!("Proceed with downloading {} chats?", plan.targets.len()),
            false,
        )
    }
}

fn unix_now() -> i64 {
    Utc::now().timestamp()
}

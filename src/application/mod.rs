//! Application layer - use cases and orchestration.
//!
//! This layer contains the pull, delete and chat creation workflows,
//! along with the local inventory, backup and output formatting they use.

pub mod artifact_sync;
pub mod backup;
pub mod chat_filter;
pub mod chat_init;
pub mod deleter;
pub mod formatter;
pub mod inventory;
pub mod project_resolver;
pub mod pull_service;

#[cfg(test)]
pub mod testing;

pub use artifact_sync::ChatArtifactSync;
pub use chat_init::{ChatInitializer, InitOutcome};
pub use deleter::{BatchDeleter, DeleteAllOutcome, DeleteOneOutcome};
pub use formatter::{
    format_chat_choices, format_chats_json, format_chats_table, format_deletion_report,
    format_project_choices, format_pull_outcome, format_pull_preview, OutputFormat,
};
pub use pull_service::PullService;

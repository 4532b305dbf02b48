//! Domain layer - core types, configuration shapes and ports.
//!
//! This layer contains pure domain models, error types and the traits
//! the workflows depend on, without any I/O of its own.

pub mod error;
pub mod models;
pub mod ports;
pub mod sync;

pub use error::{AppError, Result};
pub use models::{submodule_suffix, Chat, ChatConversation, ChatMessage, Organization, Project};
pub use ports::{ArtifactSync, ChatProvider, Prompter};
pub use sync::{
    AppConfig, ChatScope, DeleteConfig, DeletionReport, ProjectConfig, ProjectContext,
    ProviderConfig, PullOptions, TransferStats,
};

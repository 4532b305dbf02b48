//! Sync-related domain models and configuration.
//!
//! Contains the configuration file shapes, the resolved per-invocation
//! context and the small result records shared by the sync and delete flows.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{AppError, Result};

/// Provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Session key used for cookie authentication.
    #[serde(default)]
    pub session_key: Option<String>,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_key: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://claude.ai/api".to_string()
}

fn default_user_agent() -> String {
    concat!("chatsync/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Settings for `chat pull`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Directory (under the project root) that receives chat files.
    #[serde(default = "default_chat_directory")]
    pub chat_directory: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            chat_directory: default_chat_directory(),
        }
    }
}

fn default_chat_directory() -> String {
    "claude_chats".to_string()
}

/// Settings for `chat rm --all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteConfig {
    /// Maximum number of chats per delete call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Upper bound on list/delete rounds.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Consecutive rounds without a single deletion before giving up.
    #[serde(default = "default_max_stalled_pages")]
    pub max_stalled_pages: usize,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_pages: default_max_pages(),
            max_stalled_pages: default_max_stalled_pages(),
        }
    }
}

const fn default_batch_size() -> usize {
    50
}

const fn default_max_pages() -> usize {
    1000
}

const fn default_max_stalled_pages() -> usize {
    3
}

/// Global configuration (`~/.chatsync/config.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Organization used when none is given by the project or environment.
    #[serde(default)]
    pub active_organization_id: Option<String>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub delete: DeleteConfig,
}

impl AppConfig {
    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".chatsync")
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }
}

/// Project-local configuration (`<project>/.chatsync/project.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub active_project_id: Option<String>,

    #[serde(default)]
    pub active_project_name: Option<String>,

    /// Overrides the global organization for this project.
    #[serde(default)]
    pub active_organization_id: Option<String>,
}

/// Everything a command needs to address the provider and the local tree.
#[derive(Debug, Clone, Default)]
pub struct ProjectContext {
    pub organization_id: Option<String>,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    /// Local project root (the directory holding `.chatsync`).
    pub local_path: Option<PathBuf>,
    /// Name of the chat directory under `local_path`.
    pub chat_directory: String,
}

impl ProjectContext {
    /// Organization id or a configuration error.
    ///
    /// # Errors
    /// Returns `Config` if no organization is configured.
    pub fn require_organization(&self) -> Result<&str> {
        self.organization_id.as_deref().ok_or_else(|| {
            AppError::config(
                "No active organization set. Add active_organization_id to the config or set CHATSYNC_ORG_ID.",
            )
        })
    }

    /// Active project id or a configuration error.
    ///
    /// # Errors
    /// Returns `Config` if no project is associated with the current directory.
    pub fn require_project(&self) -> Result<&str> {
        self.project_id.as_deref().ok_or_else(|| {
            AppError::config(
                "No active project. Run 'chatsync config set-project' inside the project directory.",
            )
        })
    }

    /// Local project root or a configuration error.
    ///
    /// # Errors
    /// Returns `Config` if no local project path was found.
    pub fn require_local_path(&self) -> Result<&Path> {
        self.local_path.as_deref().ok_or_else(|| {
            AppError::config("No local project path found. Please run from a project directory.")
        })
    }

    /// Destination directory for pulled chats.
    ///
    /// # Errors
    /// Returns `Config` if no local project path was found.
    pub fn chat_destination(&self) -> Result<PathBuf> {
        Ok(self.require_local_path()?.join(&self.chat_directory))
    }
}

/// Which remote chats a sync targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatScope {
    /// Every chat of the organization.
    All,
    /// Only chats associated with this project id.
    Project(String),
}

impl ChatScope {
    /// Build the scope for a context and the `--all` flag.
    ///
    /// # Errors
    /// Returns `Config` when project mode is requested without an active project.
    pub fn for_context(context: &ProjectContext, sync_all: bool) -> Result<Self> {
        if sync_all {
            Ok(Self::All)
        } else {
            Ok(Self::Project(context.require_project()?.to_string()))
        }
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Flags of `chat pull`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PullOptions {
    pub dry_run: bool,
    pub backup_existing: bool,
    pub force: bool,
    pub sync_all: bool,
}

/// Counters reported by the artifact transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Chats whose folder was written.
    pub chats_synced: usize,
    /// Chats skipped because fetching them failed.
    pub failed_chats: usize,
    /// New message files written.
    pub messages_written: usize,
    /// Message files left alone because they already existed.
    pub messages_skipped: usize,
    /// Artifact files written.
    pub artifacts_written: usize,
}

/// Accounting for a delete-all run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub deleted: usize,
    pub failed: usize,
    /// Number of list/delete rounds that issued a delete call.
    pub pages: usize,
}

//! Configuration file management.
//!
//! Handles the global TOML configuration, the project file found by
//! walking up from the working directory, and environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, ProjectConfig, ProjectContext, Result};

/// Environment variable overriding the provider session key.
pub const SESSION_KEY_ENV: &str = "CHATSYNC_SESSION_KEY";

/// Environment variable overriding the active organization.
pub const ORGANIZATION_ENV: &str = "CHATSYNC_ORG_ID";

/// Directory marking a local project root.
pub const PROJECT_DIR: &str = ".chatsync";

/// Project file inside [`PROJECT_DIR`].
pub const PROJECT_FILE: &str = "project.toml";

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# chatsync configuration
# Auto-generated - edit as needed

# Organization used when the project file does not name one
# active_organization_id = "00000000-0000-0000-0000-000000000000"

[provider]
# Base URL of the chat provider API
base_url = "https://claude.ai/api"

# Session key used for authentication (or set CHATSYNC_SESSION_KEY)
# session_key = "sk-ant-..."

[sync]
# Directory under the project root that receives pulled chats
chat_directory = "claude_chats"

[delete]
# Chats removed per delete request
batch_size = 50

# Upper bound on list/delete rounds for `chat rm --all`
max_pages = 1000

# Give up after this many rounds without a single deletion
max_stalled_pages = 3
"#;

/// Load configuration from file or create default.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config() -> Result<AppConfig> {
    let config_path = AppConfig::config_file_path();

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Create default configuration file if it doesn't exist.
///
/// Returns the config path and whether it was created.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists() -> Result<(PathBuf, bool)> {
    let config_path = AppConfig::config_file_path();
    let created = write_default_config(&config_path)?;
    Ok((config_path, created))
}

fn write_default_config(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok(true)
}

/// Nearest ancestor of `start` (inclusive) holding a project file.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_DIR).join(PROJECT_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Load the project file under `root`.
///
/// # Errors
/// Returns error if the file cannot be read or parsed.
pub fn load_project_config(root: &Path) -> Result<ProjectConfig> {
    let path = root.join(PROJECT_DIR).join(PROJECT_FILE);
    let content = fs::read_to_string(&path)
        .map_err(|e| AppError::io(format!("Failed to read project file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse project file {}: {e}", path.display()),
    })
}

/// Write the project file under `root`, creating `.chatsync` if needed.
///
/// # Errors
/// Returns error if the file cannot be written.
pub fn save_project_config(root: &Path, config: &ProjectConfig) -> Result<PathBuf> {
    let dir = root.join(PROJECT_DIR);
    fs::create_dir_all(&dir)
        .map_err(|e| AppError::io(format!("Failed to create {}", dir.display()), e))?;

    let content = toml::to_string_pretty(config).map_err(|e| AppError::Config {
        message: format!("Failed to serialize project file: {e}"),
    })?;

    let path = dir.join(PROJECT_FILE);
    fs::write(&path, content)
        .map_err(|e| AppError::io(format!("Failed to write project file: {}", path.display()), e))?;

    tracing::info!(path = %path.display(), "Project configuration saved");

    Ok(path)
}

/// Apply environment overrides read through `lookup`.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = lookup(SESSION_KEY_ENV).filter(|v| !v.is_empty()) {
        config.provider.session_key = Some(key);
    }
    if let Some(org) = lookup(ORGANIZATION_ENV).filter(|v| !v.is_empty()) {
        config.active_organization_id = Some(org);
    }
}

/// Build the invocation context for `current_dir`.
///
/// The organization comes from the environment, then the project file,
/// then the global config.
///
/// # Errors
/// Returns error if a project file exists but cannot be loaded.
pub fn resolve_context(
    config: &AppConfig,
    current_dir: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ProjectContext> {
    let mut context = ProjectContext {
        organization_id: config.active_organization_id.clone(),
        chat_directory: config.sync.chat_directory.clone(),
        ..Default::default()
    };

    if let Some(root) = find_project_root(current_dir) {
        let project = load_project_config(&root)?;
        tracing::debug!(root = %root.display(), project = ?project.active_project_id, "Found project");

        if project.active_organization_id.is_some() {
            context.organization_id = project.active_organization_id;
        }
        context.project_id = project.active_project_id;
        context.project_name = project.active_project_name;
        context.local_path = Some(root);
    }

    if let Some(org) = lookup(ORGANIZATION_ENV).filter(|v| !v.is_empty()) {
        context.organization_id = Some(org);
    }

    Ok(context)
}

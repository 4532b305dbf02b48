//! Infrastructure layer - external adapters (HTTP API, config files, terminal).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod claude_client;
pub mod config;
pub mod prompt;

pub use claude_client::ClaudeAiClient;
pub use config::{
    apply_env_overrides, ensure_config_exists, find_project_root, load_config,
    load_project_config, resolve_context, save_project_config,
};
pub use prompt::{stdin_is_terminal, NonInteractivePrompter, TerminalPrompter};

//! chatsync - Keep remote AI chats in sync with a local project tree.
//!
//! Pulls the chats of a provider project into `<project>/claude_chats`,
//! lists and deletes remote chats, and creates new chats attached to the
//! active project or one of its submodules.
//!
//! 🤖 QUICK START:
//!   chatsync config init                        # Write ~/.chatsync/config.toml
//!   chatsync config set-project --id <uuid>     # Mark this directory as a project
//!   chatsync chat pull --dry-run                # See what would be downloaded
//!   chatsync chat pull --backup-existing        # Download, keeping a backup
//!   chatsync chat rm --all                      # Delete every remote chat

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    format_chat_choices, format_chats_json, format_chats_table, format_deletion_report,
    format_project_choices, format_pull_outcome, format_pull_preview, BatchDeleter,
    ChatArtifactSync, ChatInitializer, DeleteAllOutcome, DeleteOneOutcome, InitOutcome,
    OutputFormat, PullService,
};
use cli::{ChatCommands, Cli, Commands, ConfigCommands};
use domain::{
    AppConfig, AppError, ChatProvider, ProjectConfig, ProjectContext, Prompter, PullOptions,
};
use infrastructure::{
    apply_env_overrides, ensure_config_exists, find_project_root, load_config,
    load_project_config, resolve_context, save_project_config, stdin_is_terminal, ClaudeAiClient,
    NonInteractivePrompter, TerminalPrompter,
};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Everything a command needs: configuration, context and the operator.
struct Session {
    config: AppConfig,
    context: ProjectContext,
    current_dir: PathBuf,
    prompter: Box<dyn Prompter>,
}

impl Session {
    fn load(non_interactive: bool) -> domain::Result<Self> {
        let mut config = load_config()?;
        apply_env_overrides(&mut config, env_var);

        let current_dir = std::env::current_dir()
            .map_err(|e| AppError::io("Failed to read current directory", e))?;
        let context = resolve_context(&config, &current_dir, env_var)?;

        let prompter: Box<dyn Prompter> = if non_interactive || !stdin_is_terminal() {
            tracing::debug!("Running without prompts");
            Box::new(NonInteractivePrompter)
        } else {
            Box::new(TerminalPrompter::stdio())
        };

        Ok(Self {
            config,
            context,
            current_dir,
            prompter,
        })
    }

    fn client(&self) -> domain::Result<ClaudeAiClient> {
        ClaudeAiClient::new(&self.config.provider)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Main application logic.
fn run(cli: Cli) -> domain::Result<()> {
    let mut session = Session::load(cli.non_interactive)?;

    match cli.command {
        Commands::Chat { command } => match command {
            ChatCommands::Pull {
                dry_run,
                backup_existing,
                force,
                all,
            } => {
                let options = PullOptions {
                    dry_run,
                    backup_existing,
                    force,
                    sync_all: all,
                };
                cmd_pull(&mut session, &options)?;
            }
            ChatCommands::Ls { format } => {
                let format = cli::parse_format(&format).map_err(AppError::config)?;
                cmd_ls(&session, format)?;
            }
            ChatCommands::Rm { all } => {
                cmd_rm(&mut session, all)?;
            }
            ChatCommands::Init { name, project } => {
                cmd_init(&mut session, name.as_deref(), project.as_deref())?;
            }
        },
        Commands::Config { command } => match command {
            ConfigCommands::Init => {
                cmd_config_init()?;
            }
            ConfigCommands::Show => {
                cmd_config_show(&session)?;
            }
            ConfigCommands::SetProject {
                id,
                name,
                organization,
            } => {
                cmd_set_project(&session.current_dir, id, name, organization)?;
            }
        },
    }

    Ok(())
}

/// Pull chats into the project's chat directory.
fn cmd_pull(session: &mut Session, options: &PullOptions) -> domain::Result<()> {
    let client = session.client()?;
    let transfer = ChatArtifactSync::new()?;
    let service = PullService::new(&client, &transfer);

    let plan = service.plan(&session.context, options)?;
    if plan.has_targets() {
        print!("{}", format_pull_preview(&plan));
        println!();
    }

    let outcome = service.execute(&session.context, &plan, options, session.prompter.as_mut())?;
    print!("{}", format_pull_outcome(&outcome));

    Ok(())
}

/// List the organization's chats.
fn cmd_ls(session: &Session, format: OutputFormat) -> domain::Result<()> {
    let organization_id = session.context.require_organization()?;
    let client = session.client()?;

    let chats = client.list_chats(organization_id)?;

    match format {
        OutputFormat::Table => {
            if chats.is_empty() {
                println!("No chats found.");
            } else {
                println!("{}", format_chats_table(&chats));
                println!();
                println!("Total: {} chat(s)", chats.len());
            }
        }
        OutputFormat::Json => {
            println!("{}", format_chats_json(&chats).map_err(AppError::json_parse)?);
        }
    }

    Ok(())
}

/// Delete one chat interactively, or every chat with `--all`.
fn cmd_rm(session: &mut Session, all: bool) -> domain::Result<()> {
    let organization_id = session.context.require_organization()?.to_string();
    let client = session.client()?;
    let deleter = BatchDeleter::new(&client, session.config.delete.clone());

    if all {
        let outcome = deleter.delete_all(&organization_id, session.prompter.as_mut(), |report| {
            println!(
                "Deleted {} chats so far ({} pages)",
                report.deleted.to_string().cyan(),
                report.pages
            );
        })?;

        match outcome {
            DeleteAllOutcome::Cancelled => println!("{} Deletion cancelled", "✗".red()),
            DeleteAllOutcome::Finished(report) => {
                println!("{} {}", "✓".green().bold(), format_deletion_report(&report));
            }
        }
        return Ok(());
    }

    let outcome = deleter.delete_one(&organization_id, session.prompter.as_mut(), |chats| {
        print!("{}", format_chat_choices(chats));
    })?;

    match outcome {
        DeleteOneOutcome::NoChats => println!("No chats found."),
        DeleteOneOutcome::Cancelled => println!("{} Deletion cancelled", "✗".red()),
        DeleteOneOutcome::Deleted(chat) => {
            println!(
                "{} Successfully deleted chat: {}",
                "✓".green().bold(),
                chat.display_name()
            );
        }
        DeleteOneOutcome::Failed(chat) => {
            println!(
                "{} Failed to delete chat: {}",
                "✗".red(),
                chat.display_name()
            );
        }
    }

    Ok(())
}

/// Create a new chat.
fn cmd_init(
    session: &mut Session,
    name: Option<&str>,
    project: Option<&str>,
) -> domain::Result<()> {
    let client = session.client()?;
    let initializer = ChatInitializer::new(&client);

    let outcome = initializer.run(
        &session.context,
        name,
        project,
        &session.current_dir,
        session.prompter.as_mut(),
        |choices| print!("{}", format_project_choices(choices)),
    )?;

    match outcome {
        InitOutcome::NoProjects => println!("No projects found in the organization."),
        InitOutcome::NoCandidates => {
            println!("No active project or submodules found.");
        }
        InitOutcome::NoSelection => println!("{} No project selected", "✗".red()),
        InitOutcome::Created { chat, project_id } => {
            println!("{} Created new chat", "✓".green().bold());
            println!("   UUID:    {}", chat.uuid.cyan());
            println!("   Name:    {}", chat.display_name());
            println!("   Project: {project_id}");
        }
    }

    Ok(())
}

/// Write the default global configuration.
fn cmd_config_init() -> domain::Result<()> {
    let (path, created) = ensure_config_exists()?;

    if created {
        println!("{} Created {}", "✓".green().bold(), path.display());
    } else {
        println!("Configuration already exists at {}", path.display());
    }
    println!();
    println!("💡 Next steps:");
    println!("   Set provider.session_key (or CHATSYNC_SESSION_KEY) and active_organization_id");
    println!("   chatsync config set-project --id <project-uuid> --name <project-name>");

    Ok(())
}

/// Show the resolved configuration.
fn cmd_config_show(session: &Session) -> domain::Result<()> {
    let context = &session.context;
    let unset = || "(not set)".dimmed().to_string();

    println!("{}", "⚙️  chatsync configuration".bold());
    println!();
    println!("  Config file:   {}", AppConfig::config_file_path().display());
    println!("  API:           {}", session.config.provider.base_url);
    println!(
        "  Session key:   {}",
        if session.config.provider.session_key.is_some() {
            "set".green().to_string()
        } else {
            unset()
        }
    );
    println!(
        "  Organization:  {}",
        context.organization_id.clone().unwrap_or_else(unset)
    );
    println!(
        "  Project:       {}",
        context.project_id.clone().unwrap_or_else(unset)
    );
    println!(
        "  Project name:  {}",
        context.project_name.clone().unwrap_or_else(unset)
    );
    println!(
        "  Local path:    {}",
        context
            .local_path
            .as_ref()
            .map_or_else(unset, |p| p.display().to_string())
    );
    if let Ok(destination) = context.chat_destination() {
        println!("  Chat folder:   {}", destination.display());
    }

    if context.organization_id.is_none() && session.config.provider.session_key.is_some() {
        print_organizations(session);
    }

    Ok(())
}

fn print_organizations(session: &Session) {
    let organizations = session.client().and_then(|client| client.list_organizations());

    match organizations {
        Ok(organizations) if !organizations.is_empty() => {
            println!();
            println!("Available organizations:");
            for org in organizations {
                println!("  • {} ({})", org.name, org.uuid);
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Could not list organizations"),
    }
}

/// Associate the current directory (or its project root) with a project.
fn cmd_set_project(
    current_dir: &Path,
    id: String,
    name: Option<String>,
    organization: Option<String>,
) -> domain::Result<()> {
    let (root, mut project) = match find_project_root(current_dir) {
        Some(root) => {
            let project = load_project_config(&root)?;
            (root, project)
        }
        None => (current_dir.to_path_buf(), ProjectConfig::default()),
    };
    project.active_project_id = Some(id);
    if name.is_some() {
        project.active_project_name = name;
    }
    if organization.is_some() {
        project.active_organization_id = organization;
    }

    let path = save_project_config(&root, &project)?;
    println!("{} Saved {}", "✓".green().bold(), path.display());

    Ok(())
}

/// Setup logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

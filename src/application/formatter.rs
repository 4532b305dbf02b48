//! Output formatting for chat listings and pull reports.
//!
//! Supports a table view and JSON for listings; pull previews and
//! summaries are colored plain text.

use std::fmt::Write as _;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{Chat, DeletionReport};

use super::chat_init::ProjectChoices;
use super::pull_service::{PullOutcome, SyncPlan};

/// Output format options for listings.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Compact table listing.
    #[default]
    Table,
    /// JSON format for programmatic use.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {s}. Use: table, json")),
        }
    }
}

/// Formats chats as JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_chats_json(chats: &[Chat]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(chats)
}

/// Formats a table listing of chats.
pub fn format_chats_table(chats: &[Chat]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["UUID", "Name", "Project", "Updated"]);

    for chat in chats {
        table.add_row(vec![
            chat.uuid.as_str(),
            &truncate(chat.display_name(), 40),
            &truncate(chat.project_name().unwrap_or(""), 25),
            chat.updated_display(),
        ]);
    }

    table.to_string()
}

/// Numbered chat list used by the delete selection.
pub fn format_chat_choices(chats: &[Chat]) -> String {
    let mut out = String::from("Available chats:\n");
    for (idx, chat) in chats.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. Name: {}, Project: {}, Updated: {}",
            idx + 1,
            chat.display_name(),
            chat.project_name().unwrap_or(""),
            chat.updated_display()
        );
    }
    out
}

/// Numbered project list used by `chat init`.
pub fn format_project_choices(choices: &ProjectChoices) -> String {
    let mut out = String::from("Available projects:\n");
    for (idx, project) in choices.candidates.iter().enumerate() {
        let kind = if project.id == choices.active_id {
            "Active Project"
        } else {
            "Submodule"
        };
        let marker = if choices.default == Some(idx) {
            " (default)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{}. {} (ID: {}) - {kind}{}",
            idx + 1,
            project.name,
            project.id,
            marker.green()
        );
    }
    out
}

/// Preview of what a pull is about to do.
pub fn format_pull_preview(plan: &SyncPlan) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", "📥 Chats to download:".bold());
    for (idx, chat) in plan.preview_chats().iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} (Project: {})",
            idx + 1,
            chat.display_name(),
            chat.project_name().unwrap_or("No Project")
        );
    }
    if plan.hidden_chat_count() > 0 {
        let _ = writeln!(out, "  ... and {} more chats", plan.hidden_chat_count());
    }

    let _ = writeln!(out, "\n📁 Download location: {}", plan.destination.display());

    if plan.has_existing_files() {
        let _ = writeln!(
            out,
            "\n{}",
            format!(
                "⚠️  WARNING: {} existing chat files found!",
                plan.existing_files.len()
            )
            .yellow()
            .bold()
        );
        let label = if plan.hidden_file_count() > 0 {
            "📄 Sample existing files:"
        } else {
            "📄 Existing files:"
        };
        let _ = writeln!(out, "{label}");
        for file in plan.sample_existing() {
            let _ = writeln!(out, "  • {}", file.display());
        }
        if plan.hidden_file_count() > 0 {
            let _ = writeln!(out, "  ... and {} more files", plan.hidden_file_count());
        }

        out.push_str("\n💡 Options to protect existing data:\n");
        out.push_str("  --backup-existing  Create backup before download\n");
        out.push_str("  --dry-run          Preview without making changes\n");
    }

    out
}

/// Final report of a pull.
pub fn format_pull_outcome(outcome: &PullOutcome) -> String {
    let mut out = String::new();

    match outcome {
        PullOutcome::NothingToSync => {
            let _ = writeln!(out, "{} No chats found to sync", "✓".green().bold());
        }
        PullOutcome::DryRun {
            destination,
            would_download,
            would_overwrite,
        } => {
            let _ = writeln!(out, "\n{}", "🔍 DRY RUN MODE - No files will be changed".bold());
            let _ = writeln!(
                out,
                "{} Would download {would_download} chats to {}",
                "✓".green(),
                destination.display()
            );
            if *would_overwrite > 0 {
                let _ = writeln!(
                    out,
                    "⚠️  Would potentially overwrite {would_overwrite} existing files"
                );
            }
            out.push_str("\n💡 Run without --dry-run to perform actual download\n");
        }
        PullOutcome::Cancelled => {
            let _ = writeln!(out, "{} Chat download cancelled", "✗".red());
        }
        PullOutcome::BackupAborted { reason } => {
            let _ = writeln!(
                out,
                "{} Chat download aborted, backup failed: {reason}",
                "✗".red()
            );
        }
        PullOutcome::Completed(summary) => {
            let _ = writeln!(
                out,
                "\n{} Chat synchronization completed!",
                "✓".green().bold()
            );
            let _ = writeln!(out, "📁 Location: {}", summary.destination.display());
            if let Some(backup) = &summary.backup {
                let _ = writeln!(out, "💾 Backup: {}", backup.display());
            }
            let stats = &summary.stats;
            let _ = writeln!(
                out,
                "   {} chats, {} new messages, {} artifacts",
                stats.chats_synced.to_string().cyan(),
                stats.messages_written.to_string().cyan(),
                stats.artifacts_written.to_string().cyan()
            );
            if stats.failed_chats > 0 {
                let _ = writeln!(
                    out,
                    "   {} chats could not be fetched",
                    stats.failed_chats.to_string().yellow()
                );
            }

            out.push_str("\n💡 Next steps:\n");
            let _ = writeln!(
                out,
                "  • Review downloaded chats in {}",
                summary.destination.display()
            );
            out.push_str("  • Use 'chatsync chat ls' to list available chats\n");
            if summary.suggest_backup {
                out.push_str("  • Consider using --backup-existing next time for safety\n");
            }
        }
    }

    out
}

/// Final report of a delete-all run.
pub fn format_deletion_report(report: &DeletionReport) -> String {
    let mut out = format!(
        "Chat deletion complete. Total chats deleted: {}",
        report.deleted.to_string().green()
    );
    if report.failed > 0 {
        let _ = write!(
            out,
            " ({} failed attempts)",
            report.failed.to_string().yellow()
        );
    }
    out
}

/// Truncates a string to max characters with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pull_service::PullSummary;
    use crate::application::testing::{chat, chats};
    use crate::domain::{ChatScope, TransferStats};
    use std::path::PathBuf;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world!", 8), "hello...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table)));
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("markdown".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_chat_choices_are_one_indexed() {
        plain();
        let mut unnamed = chat("x", None);
        unnamed.name = None;
        let out = format_chat_choices(&[chat("a", Some("p1")), unnamed]);

        assert!(out.contains("1. Name: Chat a, Project: Project p1, Updated: 2024-05-01T10:00:00Z"));
        assert!(out.contains("2. Name: Unnamed, Project: , Updated"));
    }

    #[test]
    fn test_preview_mentions_overflow() {
        plain();
        let plan = SyncPlan {
            destination: PathBuf::from("/repo/claude_chats"),
            scope: ChatScope::All,
            targets: chats(12, None),
            existing_files: (0..11).map(|i| PathBuf::from(format!("f{i}.md"))).collect(),
        };

        let out = format_pull_preview(&plan);

        assert!(out.contains("10. Chat c9 (Project: No Project)"));
        assert!(out.contains("... and 2 more chats"));
        assert!(out.contains("WARNING: 11 existing chat files found!"));
        assert!(out.contains("Sample existing files:"));
        assert!(out.contains("... and 1 more files"));
    }

    #[test]
    fn test_dry_run_report() {
        plain();
        let out = format_pull_outcome(&PullOutcome::DryRun {
            destination: PathBuf::from("/repo/claude_chats"),
            would_download: 5,
            would_overwrite: 3,
        });

        assert!(out.contains("Would download 5 chats to /repo/claude_chats"));
        assert!(out.contains("Would potentially overwrite 3 existing files"));
    }

    #[test]
    fn test_completed_report_only_shows_real_backup() {
        plain();
        let summary = PullSummary {
            destination: PathBuf::from("/repo/claude_chats"),
            backup: None,
            stats: TransferStats::default(),
            suggest_backup: true,
        };
        let out = format_pull_outcome(&PullOutcome::Completed(summary.clone()));
        assert!(!out.contains("Backup:"));
        assert!(out.contains("--backup-existing next time"));

        let out = format_pull_outcome(&PullOutcome::Completed(PullSummary {
            backup: Some(PathBuf::from("/repo/claude_chats_backup_1")),
            suggest_backup: false,
            ..summary
        }));
        assert!(out.contains("Backup: /repo/claude_chats_backup_1"));
        assert!(!out.contains("next time"));
    }

    #[test]
    fn test_deletion_report() {
        plain();
        let out = format_deletion_report(&DeletionReport {
            deleted: 107,
            failed: 0,
            pages: 3,
        });
        assert_eq!(out, "Chat deletion complete. Total chats deleted: 107");
    }
}

//! Backups of the chat destination before a pull overwrites it.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::{AppError, Result};

/// Backup location for `destination` at `timestamp` (Unix seconds).
#[must_use]
pub fn backup_path(destination: &Path, timestamp: i64) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(format!("_backup_{timestamp}"));
    PathBuf::from(name)
}

/// Copy `destination` recursively to its backup path.
///
/// Every file is copied, not only recognized chat files. The copy is built
/// in a `.partial` sibling and renamed into place once complete, so a failed
/// backup leaves nothing behind. An existing backup path is never merged into.
///
/// # Errors
/// Returns error if the backup path exists or any copy step fails.
pub fn create_backup(destination: &Path, timestamp: i64) -> Result<PathBuf> {
    let target = backup_path(destination, timestamp);
    if target.symlink_metadata().is_ok() {
        return Err(AppError::InvalidData {
            message: format!("Backup path already exists: {}", target.display()),
        });
    }

    let staging = staging_path(&target);
    if staging.symlink_metadata().is_ok() {
        tracing::warn!(path = %staging.display(), "Removing stale partial backup");
        remove_tree(&staging)?;
    }

    tracing::info!(from = %destination.display(), to = %target.display(), "Creating backup");

    let copied = copy_tree(destination, &staging);
    let target = commit_staged(&staging, target, copied)?;

    Ok(target)
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

/// Rename a finished staging tree into place, or discard it after a failed copy.
fn commit_staged(staging: &Path, target: PathBuf, copied: Result<usize>) -> Result<PathBuf> {
    let copied = match copied {
        Ok(copied) => copied,
        Err(e) => {
            if staging.symlink_metadata().is_ok() {
                if let Err(cleanup) = remove_tree(staging) {
                    tracing::warn!(path = %staging.display(), error = %cleanup, "Could not remove partial backup");
                }
            }
            return Err(e);
        }
    };

    fs::rename(staging, &target).map_err(|e| {
        AppError::io(format!("Failed to move backup into {}", target.display()), e)
    })?;

    tracing::info!(files = copied, path = %target.display(), "Backup created");

    Ok(target)
}

fn remove_tree(path: &Path) -> Result<()> {
    let removed = if path.is_dir() && !path.is_symlink() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|e| AppError::io(format!("Failed to remove {}", path.display()), e))
}

fn copy_tree(source: &Path, target: &Path) -> Result<usize> {
    let mut copied = 0usize;
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| {
            let message = format!("Failed to read {}", source.display());
            match e.into_io_error() {
                Some(io) => AppError::io(message, io),
                None => AppError::InvalidData { message },
            }
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| AppError::InvalidData {
                message: format!("Unexpected path in backup: {}", entry.path().display()),
            })?;
        let dest_path = target.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&dest_path).map_err(|e| {
                AppError::io(format!("Failed to create {}", dest_path.display()), e)
            })?;
        } else if file_type.is_symlink() {
            copy_link(entry.path(), &dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path).map_err(|e| {
                AppError::io(format!("Failed to copy {}", entry.path().display()), e)
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Recreate a symlink as-is; its target is not followed.
#[cfg(unix)]
fn copy_link(link: &Path, dest_path: &Path) -> Result<()> {
    let points_to = fs::read_link(link)
        .map_err(|e| AppError::io(format!("Failed to read link {}", link.display()), e))?;
    std::os::unix::fs::symlink(&points_to, dest_path)
        .map_err(|e| AppError::io(format!("Failed to recreate link {}", dest_path.display()), e))
}

#[cfg(not(unix))]
fn copy_link(link: &Path, _dest_path: &Path) -> Result<()> {
    tracing::warn!(path = %link.display(), "Skipping symlink in backup");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_backup_path_naming() {
        assert_eq!(
            backup_path(Path::new("X"), 1_700_000_000),
            PathBuf::from("X_backup_1700000000")
        );
        assert_eq!(
            backup_path(Path::new("/repo/claude_chats"), 42),
            PathBuf::from("/repo/claude_chats_backup_42")
        );
    }

    #[test]
    fn test_create_backup_copies_tree() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("claude_chats");
        fs::create_dir_all(dest.join("c1/artifacts")).unwrap();
        fs::write(dest.join("c1/metadata.json"), "{\"uuid\":\"c1\"}").unwrap();
        fs::write(dest.join("c1/artifacts/notes.txt"), "kept too").unwrap();

        let backup = create_backup(&dest, 123).unwrap();

        assert_eq!(backup, dir.path().join("claude_chats_backup_123"));
        assert_eq!(
            fs::read_to_string(backup.join("c1/metadata.json")).unwrap(),
            "{\"uuid\":\"c1\"}"
        );
        assert_eq!(
            fs::read_to_string(backup.join("c1/artifacts/notes.txt")).unwrap(),
            "kept too"
        );
        // Source is left intact.
        assert!(dest.join("c1/metadata.json").exists());
    }

    #[test]
    fn test_existing_backup_is_not_merged() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("chats");
        fs::create_dir_all(&dest).unwrap();
        fs::create_dir_all(dir.path().join("chats_backup_7")).unwrap();

        assert!(create_backup(&dest, 7).is_err());
    }

    #[test]
    fn test_missing_source_fails() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("missing");

        assert!(create_backup(&dest, 1).is_err());
        assert!(!dir.path().join("missing_backup_1").exists());
        assert!(!dir.path().join("missing_backup_1.partial").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_recreated() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("claude_chats");
        fs::create_dir_all(dest.join("c1")).unwrap();
        fs::write(dest.join("a.md"), "# a").unwrap();
        std::os::unix::fs::symlink("nowhere.md", dest.join("z_dangling.md")).unwrap();
        std::os::unix::fs::symlink("c1", dest.join("c1_link")).unwrap();

        let backup = create_backup(&dest, 5).unwrap();

        assert_eq!(fs::read_to_string(backup.join("a.md")).unwrap(), "# a");
        assert_eq!(
            fs::read_link(backup.join("z_dangling.md")).unwrap(),
            PathBuf::from("nowhere.md")
        );
        assert_eq!(fs::read_link(backup.join("c1_link")).unwrap(), PathBuf::from("c1"));
        assert!(!dir.path().join("claude_chats_backup_5.partial").exists());
    }

    #[test]
    fn test_failed_copy_leaves_no_backup() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("chats_backup_9");
        let staging = staging_path(&target);
        fs::create_dir_all(staging.join("c1")).unwrap();
        fs::write(staging.join("c1/half.json"), "{").unwrap();

        let failed = Err(AppError::InvalidData {
            message: "copy interrupted".into(),
        });
        assert!(commit_staged(&staging, target.clone(), failed).is_err());

        assert!(!staging.exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_stale_partial_is_replaced() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("chats");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("new.md"), "fresh").unwrap();
        let stale = dir.path().join("chats_backup_3.partial");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("old.md"), "stale").unwrap();

        let backup = create_backup(&dest, 3).unwrap();

        assert!(backup.join("new.md").exists());
        assert!(!backup.join("old.md").exists());
        assert!(!stale.exists());
    }
}

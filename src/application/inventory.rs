//! Local inventory of chat files.
//!
//! Read-only walk of the chat destination used for overwrite warnings
//! and backup decisions.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::{AppError, Result};

/// File extensions treated as chat data. Anything else is ignored by the safety checks.
pub const RECOGNIZED_EXTENSIONS: &[&str] = &["json", "md", "jsx", "py", "sql", "html"];

/// Whether a path carries one of the recognized chat extensions.
#[must_use]
pub fn is_chat_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| RECOGNIZED_EXTENSIONS.contains(&ext))
}

/// List chat files under `destination`, relative to it and sorted.
///
/// A destination that does not exist yields an empty list.
///
/// # Errors
/// Returns error only if `destination` exists but is not a directory.
pub fn scan_existing(destination: &Path) -> Result<Vec<PathBuf>> {
    if !destination.exists() {
        return Ok(Vec::new());
    }
    if !destination.is_dir() {
        return Err(AppError::InvalidData {
            message: format!("{} exists but is not a directory", destination.display()),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(destination).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !is_regular_file(&entry) || !is_chat_file(entry.path()) {
            continue;
        }

        if let Ok(relative) = entry.path().strip_prefix(destination) {
            files.push(relative.to_path_buf());
        }
    }

    files.sort();
    tracing::debug!(count = files.len(), path = %destination.display(), "Scanned existing chat files");

    Ok(files)
}

/// Regular files, plus symlinks that resolve to one.
fn is_regular_file(entry: &walkdir::DirEntry) -> bool {
    if entry.file_type().is_file() {
        return true;
    }
    entry.path_is_symlink() && fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let files = scan_existing(&dir.path().join("does-not-exist")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_scan_filters_by_extension() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("chat-1/artifacts")).unwrap();
        fs::write(root.join("chat-1/metadata.json"), "{}").unwrap();
        fs::write(root.join("chat-1/artifacts/app.jsx"), "").unwrap();
        fs::write(root.join("chat-1/artifacts/query.sql"), "").unwrap();
        fs::write(root.join("chat-1/artifacts/notes.txt"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();
        fs::write(root.join("image.png"), "").unwrap();

        let files = scan_existing(root).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("chat-1/artifacts/app.jsx"),
                PathBuf::from("chat-1/artifacts/query.sql"),
                PathBuf::from("chat-1/metadata.json"),
            ]
        );
    }

    #[test]
    fn test_scan_does_not_modify_tree() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "print(1)").unwrap();

        scan_existing(dir.path()).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("a.py")).unwrap(), "print(1)");
    }

    #[test]
    fn test_file_destination_is_rejected() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("chats");
        fs::write(&file, "").unwrap();
        assert!(scan_existing(&file).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_chat_files_are_counted() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("claude_chats");
        fs::create_dir_all(root.join("real_dir")).unwrap();
        fs::write(dir.path().join("real.md"), "# shared").unwrap();
        std::os::unix::fs::symlink("../real.md", root.join("linked.md")).unwrap();
        std::os::unix::fs::symlink("missing.md", root.join("dangling.md")).unwrap();
        std::os::unix::fs::symlink("real_dir", root.join("dir_link.md")).unwrap();

        let files = scan_existing(&root).unwrap();

        assert_eq!(files, vec![PathBuf::from("linked.md")]);
    }
}

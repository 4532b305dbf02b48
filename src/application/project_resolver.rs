//! Project selection for new chats.
//!
//! Candidates are the active project plus its live submodules. The default
//! choice is derived from where the operator is standing in the local tree.

use std::path::{Path, PathBuf};

use crate::domain::{submodule_suffix, Project, Prompter, Result};

/// Directory holding submodule checkouts under the project root.
pub const SERVICES_DIR: &str = "services";

/// The active project and its non-archived submodules, in provider order.
#[must_use]
pub fn candidate_projects(all: &[Project], active_id: &str, active_name: &str) -> Vec<Project> {
    all.iter()
        .filter(|p| p.id == active_id || p.is_submodule_of(active_name))
        .cloned()
        .collect()
}

/// Where a candidate is expected to be checked out locally.
#[must_use]
pub fn expected_path(
    project: &Project,
    active_id: &str,
    active_name: &str,
    local_path: &Path,
) -> PathBuf {
    if project.id == active_id {
        return local_path.to_path_buf();
    }

    let suffix = submodule_suffix(&project.name, active_name).unwrap_or(&project.name);
    local_path.join(SERVICES_DIR).join(suffix)
}

/// Index of the candidate whose expected path contains `current_dir`.
///
/// Paths are compared component-wise. When several candidates match, the
/// deepest expected path wins; ties keep the earlier candidate.
#[must_use]
pub fn default_project_index(
    active_id: &str,
    active_name: &str,
    local_path: &Path,
    current_dir: &Path,
    candidates: &[Project],
) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;

    for (idx, project) in candidates.iter().enumerate() {
        let path = expected_path(project, active_id, active_name, local_path);
        if !current_dir.starts_with(&path) {
            continue;
        }

        let depth = path.components().count();
        if best.is_none_or(|(_, best_depth)| depth > best_depth) {
            best = Some((idx, depth));
        }
    }

    best.map(|(idx, _)| idx)
}

/// Ask the operator to pick one of `candidates`, offering `default`.
///
/// Returns `None` when no answer is available and there is no default.
///
/// # Errors
/// Propagates prompt errors.
pub fn prompt_project_choice(
    candidates: &[Project],
    default: Option<usize>,
    prompter: &mut dyn Prompter,
) -> Result<Option<usize>> {
    let mut message = String::from("Enter the number of the project to associate with the chat");
    if let Some(idx) = default {
        message.push_str(&format!(" (default: {} - {})", idx + 1, candidates[idx].name));
    }
    let default_answer = default.map(|idx| (idx + 1).to_string());

    loop {
        let Some(answer) = prompter.input(&message, default_answer.as_deref())? else {
            return Ok(default);
        };

        let answer = answer.trim();
        if answer.is_empty() {
            if default.is_some() {
                return Ok(default);
            }
            prompter.notify("A project number is required.");
            continue;
        }

        match answer.parse::<usize>() {
            Ok(n) if (1..=candidates.len()).contains(&n) => return Ok(Some(n - 1)),
            _ => prompter.notify("Invalid selection. Please try again."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::ScriptedPrompter;

    fn project(id: &str, name: &str, archived: bool) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            archived_at: archived.then(|| "2024-01-01".to_string()),
        }
    }

    fn family() -> Vec<Project> {
        vec![
            project("p1", "myapp", false),
            project("p2", "myapp-SubModule-auth", false),
            project("p3", "myapp-SubModule-billing", true),
            project("p4", "other", false),
            project("p5", "myapp-SubModule-api", false),
        ]
    }

    #[test]
    fn test_candidates_exclude_archived_and_unrelated() {
        let candidates = candidate_projects(&family(), "p1", "myapp");
        let ids: Vec<_> = candidates.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p5"]);
    }

    #[test]
    fn test_submodule_directory_selects_submodule() {
        let candidates = candidate_projects(&family(), "p1", "myapp");

        let idx = default_project_index(
            "p1",
            "myapp",
            Path::new("/repo"),
            Path::new("/repo/services/auth/src"),
            &candidates,
        );

        assert_eq!(idx.map(|i| candidates[i].id.as_str()), Some("p2"));
    }

    #[test]
    fn test_project_root_selects_active_project() {
        let candidates = candidate_projects(&family(), "p1", "myapp");
        let idx = default_project_index(
            "p1",
            "myapp",
            Path::new("/repo"),
            Path::new("/repo/docs"),
            &candidates,
        );
        assert_eq!(idx, Some(0));
    }

    #[test]
    fn test_unrelated_directory_selects_nothing() {
        let candidates = vec![project("p2", "myapp-SubModule-auth", false)];
        let idx = default_project_index(
            "p1",
            "myapp",
            Path::new("/repo"),
            Path::new("/repo/other"),
            &candidates,
        );
        assert_eq!(idx, None);

        let candidates = candidate_projects(&family(), "p1", "myapp");
        let idx = default_project_index(
            "p1",
            "myapp",
            Path::new("/repo"),
            Path::new("/elsewhere"),
            &candidates,
        );
        assert_eq!(idx, None);
    }

    #[test]
    fn test_component_prefix_only() {
        let candidates = vec![project("p2", "myapp-SubModule-auth", false)];
        let idx = default_project_index(
            "p1",
            "myapp",
            Path::new("/repo"),
            Path::new("/repo/services/auth2"),
            &candidates,
        );
        assert_eq!(idx, None);
    }

    #[test]
    fn test_prompt_uses_default_on_empty_answer() {
        let candidates = candidate_projects(&family(), "p1", "myapp");
        let mut prompter = ScriptedPrompter::answering(&[""], &[]);

        let choice = prompt_project_choice(&candidates, Some(1), &mut prompter).unwrap();

        assert_eq!(choice, Some(1));
        assert!(prompter.asked[0].ends_with("(default: 2 - myapp-SubModule-auth)"));
    }

    #[test]
    fn test_prompt_requires_choice_without_default() {
        let candidates = candidate_projects(&family(), "p1", "myapp");
        let mut prompter = ScriptedPrompter::answering(&["", "9", "3"], &[]);

        let choice = prompt_project_choice(&candidates, None, &mut prompter).unwrap();

        assert_eq!(choice, Some(2));
        assert_eq!(prompter.notes.len(), 2);
    }
}

//! Creating a new chat associated with the active project or a submodule.

use std::path::Path;

use crate::domain::{Chat, ChatProvider, Project, ProjectContext, Prompter, Result};

use super::project_resolver::{candidate_projects, default_project_index, prompt_project_choice};

/// How `chat init` ended.
#[derive(Debug, Clone)]
pub enum InitOutcome {
    /// The organization has no projects at all.
    NoProjects,
    /// Neither the active project nor a submodule was found.
    NoCandidates,
    /// The operator gave no usable project choice.
    NoSelection,
    /// The chat was created.
    Created { chat: Chat, project_id: String },
}

/// Candidate list plus the default index, as shown to the operator.
#[derive(Debug, Clone)]
pub struct ProjectChoices {
    pub candidates: Vec<Project>,
    pub active_id: String,
    pub default: Option<usize>,
}

/// Projects offered by `chat init`, or why there are none.
#[derive(Debug, Clone)]
pub enum ProjectSelection {
    /// Candidates to choose from.
    Available(ProjectChoices),
    /// The organization has no projects at all.
    NoProjects,
    /// Neither the active project nor a submodule was found.
    NoCandidates,
}

/// Create a chat, picking the project interactively when none is given.
pub struct ChatInitializer<'a> {
    provider: &'a dyn ChatProvider,
}

impl<'a> ChatInitializer<'a> {
    #[must_use]
    pub fn new(provider: &'a dyn ChatProvider) -> Self {
        Self { provider }
    }

    /// Compute candidates and the default for `current_dir`.
    ///
    /// # Errors
    /// Returns `Config` without organization or project, propagates provider errors.
    pub fn project_choices(
        &self,
        context: &ProjectContext,
        current_dir: &Path,
    ) -> Result<ProjectSelection> {
        let organization_id = context.require_organization()?;
        let active_id = context.require_project()?;

        let all = self.provider.list_projects(organization_id)?;
        if all.is_empty() {
            return Ok(ProjectSelection::NoProjects);
        }

        // Fall back to the remote name when the project file does not carry one.
        let active_name = context
            .project_name
            .clone()
            .or_else(|| all.iter().find(|p| p.id == active_id).map(|p| p.name.clone()))
            .unwrap_or_default();

        let candidates = candidate_projects(&all, active_id, &active_name);
        if candidates.is_empty() {
            return Ok(ProjectSelection::NoCandidates);
        }

        let default = context.local_path.as_deref().and_then(|local_path| {
            let local_path = absolute(local_path, current_dir);
            default_project_index(active_id, &active_name, &local_path, current_dir, &candidates)
        });

        Ok(ProjectSelection::Available(ProjectChoices {
            candidates,
            active_id: active_id.to_string(),
            default,
        }))
    }

    /// Run `chat init`.
    ///
    /// # Errors
    /// Returns `Config` without organization, propagates provider and prompt errors.
    pub fn run(
        &self,
        context: &ProjectContext,
        name: Option<&str>,
        project: Option<&str>,
        current_dir: &Path,
        prompter: &mut dyn Prompter,
        show_choices: impl FnOnce(&ProjectChoices),
    ) -> Result<InitOutcome> {
        let organization_id = context.require_organization()?;

        let project_id = if let Some(project) = project {
            project.to_string()
        } else {
            let choices = match self.project_choices(context, current_dir)? {
                ProjectSelection::Available(choices) => choices,
                ProjectSelection::NoProjects => return Ok(InitOutcome::NoProjects),
                ProjectSelection::NoCandidates => return Ok(InitOutcome::NoCandidates),
            };
            show_choices(&choices);

            match prompt_project_choice(&choices.candidates, choices.default, prompter)? {
                Some(idx) => choices.candidates[idx].id.clone(),
                None => return Ok(InitOutcome::NoSelection),
            }
        };

        let name = name.filter(|n| !n.is_empty());
        let chat = self
            .provider
            .create_chat(organization_id, name, Some(&project_id), None)?;

        tracing::info!(chat = %chat.uuid, project = %project_id, "Created chat");

        Ok(InitOutcome::Created { chat, project_id })
    }
}

fn absolute(path: &Path, current_dir: &Path) -> std::path::PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        current_dir.join(path)
    }
}

//! In-memory fakes shared by the application tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::path::Path;

use crate::domain::{
    models::ChatProject, AppError, ArtifactSync, Chat, ChatConversation, ChatProvider, ChatScope,
    ProjectContext, Project, Prompter, Result, TransferStats,
};

pub fn chat(uuid: &str, project: Option<&str>) -> Chat {
    Chat {
        uuid: uuid.to_string(),
        name: Some(format!("Chat {uuid}")),
        project: project.map(|p| ChatProject {
            uuid: p.to_string(),
            name: Some(format!("Project {p}")),
        }),
        updated_at: Some("2024-05-01T10:00:00Z".to_string()),
    }
}

pub fn chats(count: usize, project: Option<&str>) -> Vec<Chat> {
    (0..count).map(|i| chat(&format!("c{i}"), project)).collect()
}

/// Provider backed by a vector of chats; deletes really remove them.
#[derive(Default)]
pub struct FakeProvider {
    pub chats: RefCell<Vec<Chat>>,
    pub projects: Vec<Project>,
    pub conversations: HashMap<String, ChatConversation>,
    /// Every call, in order (`list`, `delete:<n>`, `get:<uuid>`, `create`, `projects`).
    pub calls: RefCell<Vec<String>>,
    /// Fail this many upcoming delete calls.
    pub failing_deletes: Cell<usize>,
    /// Fail every delete call.
    pub always_fail_delete: bool,
    pub fail_list: bool,
}

impl FakeProvider {
    pub fn with_chats(chats: Vec<Chat>) -> Self {
        Self {
            chats: RefCell::new(chats),
            ..Default::default()
        }
    }

    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl ChatProvider for FakeProvider {
    fn list_chats(&self, _organization_id: &str) -> Result<Vec<Chat>> {
        self.calls.borrow_mut().push("list".into());
        if self.fail_list {
            return Err(AppError::provider("listing unavailable", Some(503)));
        }
        Ok(self.chats.borrow().clone())
    }

    fn get_chat(&self, _organization_id: &str, chat_uuid: &str) -> Result<ChatConversation> {
        self.calls.borrow_mut().push(format!("get:{chat_uuid}"));
        self.conversations
            .get(chat_uuid)
            .cloned()
            .ok_or_else(|| AppError::provider(format!("chat {chat_uuid} not found"), Some(404)))
    }

    fn delete_chats(&self, _organization_id: &str, uuids: &[String]) -> Result<Vec<String>> {
        self.calls.borrow_mut().push(format!("delete:{}", uuids.len()));
        if self.always_fail_delete {
            return Err(AppError::provider("delete rejected", Some(500)));
        }
        if self.failing_deletes.get() > 0 {
            self.failing_deletes.set(self.failing_deletes.get() - 1);
            return Err(AppError::provider("delete rejected", Some(500)));
        }
        self.chats.borrow_mut().retain(|c| !uuids.contains(&c.uuid));
        Ok(uuids.to_vec())
    }

    fn create_chat(
        &self,
        _organization_id: &str,
        name: Option<&str>,
        project_uuid: Option<&str>,
        _model: Option<&str>,
    ) -> Result<Chat> {
        self.calls.borrow_mut().push("create".into());
        let created = Chat {
            uuid: "new-chat".into(),
            name: name.map(String::from),
            project: project_uuid.map(|p| ChatProject {
                uuid: p.to_string(),
                name: None,
            }),
            updated_at: None,
        };
        self.chats.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn list_projects(&self, _organization_id: &str) -> Result<Vec<Project>> {
        self.calls.borrow_mut().push("projects".into());
        Ok(self.projects.clone())
    }
}

/// Prompter answering from queues and recording everything it was asked.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub confirms: VecDeque<bool>,
    pub inputs: VecDeque<Option<String>>,
    pub asked: Vec<String>,
    pub notes: Vec<String>,
}

impl ScriptedPrompter {
    pub fn confirming(answers: &[bool]) -> Self {
        Self {
            confirms: answers.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn answering(inputs: &[&str], confirms: &[bool]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| Some((*s).to_string())).collect(),
            confirms: confirms.iter().copied().collect(),
            ..Default::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool> {
        self.asked.push(message.to_string());
        self.confirms
            .pop_front()
            .ok_or_else(|| AppError::InvalidData {
                message: format!("unexpected confirmation: {message}"),
            })
    }

    fn input(&mut self, message: &str, _default: Option<&str>) -> Result<Option<String>> {
        self.asked.push(message.to_string());
        Ok(self.inputs.pop_front().flatten())
    }

    fn notify(&mut self, message: &str) {
        self.notes.push(message.to_string());
    }
}

/// Artifact sync that only records the scope of each invocation.
#[derive(Default)]
pub struct RecordingSync {
    pub calls: RefCell<Vec<ChatScope>>,
}

impl ArtifactSync for RecordingSync {
    fn sync(
        &self,
        _provider: &dyn ChatProvider,
        _context: &ProjectContext,
        _destination: &Path,
        scope: &ChatScope,
    ) -> Result<TransferStats> {
        self.calls.borrow_mut().push(scope.clone());
        Ok(TransferStats {
            chats_synced: 1,
            ..Default::default()
        })
    }
}

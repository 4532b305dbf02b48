//! Writes pulled chats and their artifacts to disk.
//!
//! Layout under the destination:
//!
//! ```text
//! <chat-uuid>/metadata.json
//! <chat-uuid>/<message-uuid>.json
//! <chat-uuid>/artifacts/<identifier>.<ext>
//! ```
//!
//! Message files are written once and never rewritten; metadata and
//! artifacts are refreshed on every pull.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::domain::{
    AppError, ArtifactSync, Chat, ChatMessage, ChatProvider, ChatScope, ProjectContext, Result,
    TransferStats,
};

use super::chat_filter::list_target_chats;

const ARTIFACT_PATTERN: &str = r"<antArtifact\s+([^>]*)>([\s\S]*?)</antArtifact>";
const ATTRIBUTE_PATTERN: &str = r#"([A-Za-z_]+)="([^"]*)""#;

/// An artifact block found in an assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub identifier: String,
    pub kind: String,
    pub language: Option<String>,
    pub title: Option<String>,
    pub content: String,
}

impl Artifact {
    /// File name for this artifact, derived from its identifier and type.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "{}.{}",
            sanitize(&self.identifier),
            extension_for(&self.kind, self.language.as_deref())
        )
    }
}

/// File extension for an artifact type.
#[must_use]
pub fn extension_for(kind: &str, language: Option<&str>) -> &'static str {
    match kind {
        "text/html" => "html",
        "application/vnd.ant.react" => "jsx",
        "text/markdown" => "md",
        "image/svg+xml" => "svg",
        "application/vnd.ant.mermaid" => "mmd",
        "application/vnd.ant.code" => match language.map(str::to_ascii_lowercase).as_deref() {
            Some("python") => "py",
            Some("sql") => "sql",
            Some("javascript") => "js",
            Some("typescript") => "ts",
            Some("html") => "html",
            Some("json") => "json",
            Some("markdown") => "md",
            Some("rust") => "rs",
            Some("bash" | "shell" | "sh") => "sh",
            _ => "txt",
        },
        _ => "txt",
    }
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "artifact".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Default [`ArtifactSync`] writing JSON records and extracted artifacts.
pub struct ChatArtifactSync {
    artifact_re: Regex,
    attribute_re: Regex,
}

impl ChatArtifactSync {
    /// Build the writer.
    ///
    /// # Errors
    /// Returns error if the artifact patterns fail to compile.
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| AppError::InvalidData {
                message: format!("Invalid artifact pattern: {e}"),
            })
        };

        Ok(Self {
            artifact_re: compile(ARTIFACT_PATTERN)?,
            attribute_re: compile(ATTRIBUTE_PATTERN)?,
        })
    }

    /// Extract artifact blocks from message text. Blocks without an identifier are skipped.
    #[must_use]
    pub fn extract_artifacts(&self, text: &str) -> Vec<Artifact> {
        self.artifact_re
            .captures_iter(text)
            .filter_map(|caps| {
                let attrs = caps.get(1)?.as_str();
                let body = caps.get(2)?.as_str();

                let mut identifier = None;
                let mut kind = None;
                let mut language = None;
                let mut title = None;
                for attr in self.attribute_re.captures_iter(attrs) {
                    let value = attr[2].to_string();
                    match &attr[1] {
                        "identifier" => identifier = Some(value),
                        "type" => kind = Some(value),
                        "language" => language = Some(value),
                        "title" => title = Some(value),
                        _ => {}
                    }
                }

                Some(Artifact {
                    identifier: identifier?,
                    kind: kind.unwrap_or_default(),
                    language,
                    title,
                    content: body.trim().to_string(),
                })
            })
            .collect()
    }

    fn sync_chat(
        &self,
        provider: &dyn ChatProvider,
        organization_id: &str,
        chat: &Chat,
        destination: &Path,
        stats: &mut TransferStats,
    ) -> Result<()> {
        let folder = destination.join(sanitize(&chat.uuid));
        fs::create_dir_all(&folder)
            .map_err(|e| AppError::io(format!("Failed to create {}", folder.display()), e))?;

        write_json(&folder.join("metadata.json"), chat)?;

        let conversation = provider.get_chat(organization_id, &chat.uuid)?;

        for message in &conversation.chat_messages {
            let message_path = folder.join(format!("{}.json", sanitize(&message.uuid)));
            if message_path.exists() {
                stats.messages_skipped += 1;
            } else {
                write_json(&message_path, message)?;
                stats.messages_written += 1;
            }

            if message.is_assistant() {
                stats.artifacts_written += self.write_artifacts(&folder, message)?;
            }
        }

        Ok(())
    }

    fn write_artifacts(&self, folder: &Path, message: &ChatMessage) -> Result<usize> {
        let artifacts = self.extract_artifacts(&message.text);
        if artifacts.is_empty() {
            return Ok(0);
        }

        let dir = folder.join("artifacts");
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::io(format!("Failed to create {}", dir.display()), e))?;

        for artifact in &artifacts {
            let path = dir.join(artifact.file_name());
            fs::write(&path, &artifact.content)
                .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;
            tracing::debug!(path = %path.display(), "Wrote artifact");
        }

        Ok(artifacts.len())
    }
}

impl ArtifactSync for ChatArtifactSync {
    fn sync(
        &self,
        provider: &dyn ChatProvider,
        context: &ProjectContext,
        destination: &Path,
        scope: &ChatScope,
    ) -> Result<TransferStats> {
        let organization_id = context.require_organization()?;

        fs::create_dir_all(destination).map_err(|e| {
            AppError::io(format!("Failed to create {}", destination.display()), e)
        })?;

        let chats = list_target_chats(provider, organization_id, scope)?;
        let mut stats = TransferStats::default();

        for chat in &chats {
            match self.sync_chat(provider, organization_id, chat, destination, &mut stats) {
                Ok(()) => stats.chats_synced += 1,
                Err(e) if e.is_remote() => {
                    tracing::warn!(chat = %chat.uuid, error = %e, "Skipping chat");
                    stats.failed_chats += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            chats = stats.chats_synced,
            failed = stats.failed_chats,
            messages = stats.messages_written,
            artifacts = stats.artifacts_written,
            "Chat transfer finished"
        );

        Ok(stats)
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).map_err(AppError::json_parse)?;
    fs::write(path, content)
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{chat, FakeProvider};
    use crate::domain::ChatConversation;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const REPLY: &str = r#"Here you go.
<antArtifact identifier="etl-script" type="application/vnd.ant.code" language="python" title="ETL">
print("hello")
</antArtifact>
And a page:
<antArtifact identifier="landing page" type="text/html" title="Landing">
<h1>Hi</h1>
</antArtifact>
<antArtifact type="text/markdown" title="No id">ignored</antArtifact>"#;

    fn message(uuid: &str, sender: &str, text: &str) -> ChatMessage {
        ChatMessage {
            uuid: uuid.to_string(),
            sender: sender.to_string(),
            text: text.to_string(),
            created_at: None,
        }
    }

    fn context(sync_root: &Path) -> ProjectContext {
        ProjectContext {
            organization_id: Some("org".into()),
            project_id: Some("p1".into()),
            project_name: None,
            local_path: Some(sync_root.to_path_buf()),
            chat_directory: "claude_chats".into(),
        }
    }

    #[test]
    fn test_extract_artifacts() {
        let sync = ChatArtifactSync::new().unwrap();
        let artifacts = sync.extract_artifacts(REPLY);

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].identifier, "etl-script");
        assert_eq!(artifacts[0].language.as_deref(), Some("python"));
        assert_eq!(artifacts[0].content, "print(\"hello\")");
        assert_eq!(artifacts[0].file_name(), "etl-script.py");
        assert_eq!(artifacts[1].file_name(), "landing_page.html");
        assert_eq!(artifacts[1].title.as_deref(), Some("Landing"));
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for("application/vnd.ant.react", None), "jsx");
        assert_eq!(extension_for("application/vnd.ant.code", Some("SQL")), "sql");
        assert_eq!(extension_for("application/vnd.ant.code", Some("cobol")), "txt");
        assert_eq!(extension_for("text/markdown", None), "md");
        assert_eq!(extension_for("something/else", None), "txt");
    }

    #[test]
    fn test_sync_writes_layout_and_skips_existing_messages() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("claude_chats");
        let mut provider = FakeProvider::with_chats(vec![
            chat("c1", Some("p1")),
            chat("c2", Some("p2")),
            chat("c3", Some("p1")),
        ]);
        provider.conversations.insert(
            "c1".into(),
            ChatConversation {
                uuid: "c1".into(),
                name: None,
                chat_messages: vec![message("m1", "human", "hi"), message("m2", "assistant", REPLY)],
            },
        );
        // c3 has no conversation: fetching it fails and it is skipped.

        fs::create_dir_all(destination.join("c1")).unwrap();
        fs::write(destination.join("c1/m1.json"), "local edit").unwrap();

        let sync = ChatArtifactSync::new().unwrap();
        let stats = sync
            .sync(
                &provider,
                &context(dir.path()),
                &destination,
                &ChatScope::Project("p1".into()),
            )
            .unwrap();

        assert_eq!(
            stats,
            TransferStats {
                chats_synced: 1,
                failed_chats: 1,
                messages_written: 1,
                messages_skipped: 1,
                artifacts_written: 2,
            }
        );
        assert_eq!(
            fs::read_to_string(destination.join("c1/m1.json")).unwrap(),
            "local edit"
        );
        assert!(destination.join("c1/metadata.json").exists());
        assert!(destination.join("c1/m2.json").exists());
        assert_eq!(
            fs::read_to_string(destination.join("c1/artifacts/etl-script.py")).unwrap(),
            "print(\"hello\")"
        );
        assert!(!destination.join("c2").exists());

        let written = crate::application::inventory::scan_existing(&destination).unwrap();
        assert!(written.contains(&PathBuf::from("c1/artifacts/landing_page.html")));
    }
}

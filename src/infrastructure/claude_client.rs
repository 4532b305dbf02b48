//! HTTP client for the claude.ai web API.
//!
//! Authenticates with the browser session cookie and maps every non-2xx
//! answer to [`AppError::Provider`].

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{
    AppError, Chat, ChatConversation, ChatProvider, Organization, Project, ProviderConfig, Result,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const ERROR_EXCERPT_CHARS: usize = 200;

#[derive(Serialize)]
struct DeleteManyRequest<'a> {
    conversation_uuids: &'a [String],
}

#[derive(Serialize)]
struct CreateChatRequest<'a> {
    uuid: String,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_uuid: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

/// Blocking client for the provider API.
pub struct ClaudeAiClient {
    client: Client,
    base_url: String,
}

impl ClaudeAiClient {
    /// Build a client from the provider settings.
    ///
    /// # Errors
    /// Returns `Config` without a session key, `Http` if the client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let session_key = config
            .session_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppError::config(
                    "No session key configured. Set provider.session_key or CHATSYNC_SESSION_KEY.",
                )
            })?;

        let mut headers = HeaderMap::new();
        let cookie = HeaderValue::from_str(&format!("sessionKey={session_key}"))
            .map_err(|_| AppError::config("Session key contains invalid characters"))?;
        headers.insert(COOKIE, cookie);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| AppError::config("User agent contains invalid characters"))?;
        headers.insert(USER_AGENT, agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AppError::http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Organizations visible to the session.
    ///
    /// # Errors
    /// Returns `Provider`/`Http` on request failure, `JsonParse` on bad payloads.
    pub fn list_organizations(&self) -> Result<Vec<Organization>> {
        self.send_json(self.client.get(self.url("organizations")))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn conversations_url(&self, organization_id: &str) -> String {
        self.url(&format!("organizations/{organization_id}/chat_conversations"))
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().map_err(AppError::http)?;
        let status = response.status();
        tracing::debug!(url = %response.url(), status = status.as_u16(), "Provider response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(AppError::provider(
            excerpt(&body, status.canonical_reason().unwrap_or("request failed")),
            Some(status.as_u16()),
        ))
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request)?.text().map_err(AppError::http)?;
        serde_json::from_str(&body).map_err(AppError::json_parse)
    }
}

/// First characters of an error body, or `fallback` when it is blank.
fn excerpt(body: &str, fallback: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return fallback.to_string();
    }

    let mut out: String = body.chars().take(ERROR_EXCERPT_CHARS).collect();
    if body.chars().count() > ERROR_EXCERPT_CHARS {
        out.push_str("...");
    }
    out
}

impl ChatProvider for ClaudeAiClient {
    fn list_chats(&self, organization_id: &str) -> Result<Vec<Chat>> {
        let chats: Vec<Chat> =
            self.send_json(self.client.get(self.conversations_url(organization_id)))?;
        tracing::debug!(count = chats.len(), "Listed chats");
        Ok(chats)
    }

    fn get_chat(&self, organization_id: &str, chat_uuid: &str) -> Result<ChatConversation> {
        let url = format!("{}/{chat_uuid}", self.conversations_url(organization_id));
        self.send_json(
            self.client
                .get(url)
                .query(&[("rendering_mode", "raw")]),
        )
    }

    fn delete_chats(&self, organization_id: &str, uuids: &[String]) -> Result<Vec<String>> {
        if uuids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/delete_many", self.conversations_url(organization_id));
        self.send(self.client.post(url).json(&DeleteManyRequest {
            conversation_uuids: uuids,
        }))?;

        Ok(uuids.to_vec())
    }

    fn create_chat(
        &self,
        organization_id: &str,
        name: Option<&str>,
        project_uuid: Option<&str>,
        model: Option<&str>,
    ) -> Result<Chat> {
        let body = CreateChatRequest {
            uuid: uuid::Uuid::new_v4().to_string(),
            name: name.unwrap_or(""),
            project_uuid,
            model,
        };

        self.send_json(
            self.client
                .post(self.conversations_url(organization_id))
                .json(&body),
        )
    }

    fn list_projects(&self, organization_id: &str) -> Result<Vec<Project>> {
        self.send_json(
            self.client
                .get(self.url(&format!("organizations/{organization_id}/projects"))),
        )
    }
}

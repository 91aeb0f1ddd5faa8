//! Remote template service client.
//!
//! Talks to the Langfuse prompt API over blocking HTTP. Fetch failures are
//! reported as errors for the caller to downgrade; the resolver treats them
//! as a signal to fall through, administrative operations surface them.

use serde::Deserialize;
use std::collections::HashMap;

use crate::config::LangfuseSettings;
use crate::error::AgentError;
use crate::prompt::template;

const DEFAULT_BASE_URL: &str = "https://cloud.langfuse.com";
const PROMPTS_API_PATH: &str = "api/public/v2/prompts";

/// A prompt fetch request: name plus optional label/version pin.
#[derive(Debug, Clone, Default)]
pub struct PromptRequest {
    pub name: String,
    pub label: Option<String>,
    pub version: Option<u32>,
}

/// Chat message inside a chat-type remote prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Remote prompt payload: plain text or a chat message list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PromptPayload {
    Text(String),
    Chat(Vec<ChatMessage>),
}

/// A prompt as returned by the remote service.
#[derive(Debug, Clone, Deserialize)]
pub struct RemotePrompt {
    pub prompt: PromptPayload,
}

impl RemotePrompt {
    /// Wrap locally-assembled fallback text in the remote prompt shape.
    pub fn from_fallback(text: String) -> Self {
        Self {
            prompt: PromptPayload::Text(text),
        }
    }

    /// Substitute `{{name}}` placeholders and flatten chat prompts to
    /// `role: content` lines separated by blank lines.
    pub fn compile(&self, variables: &HashMap<String, String>) -> String {
        match &self.prompt {
            PromptPayload::Text(text) => template::render_remote(text, variables).trim().to_string(),
            PromptPayload::Chat(messages) => {
                let parts: Vec<String> = messages
                    .iter()
                    .map(|message| {
                        let role = if message.role.is_empty() {
                            "user"
                        } else {
                            &message.role
                        };
                        let content = template::render_remote(&message.content, variables);
                        format!("{}: {}", role, content).trim().to_string()
                    })
                    .collect();
                parts.join("\n\n").trim().to_string()
            }
        }
    }
}

/// Blocking client for the remote prompt API.
pub struct LangfuseClient {
    http: reqwest::blocking::Client,
    base_url: String,
    public_key: String,
    secret_key: String,
}

impl LangfuseClient {
    /// Construct from settings. Returns `None` unless both keys are present.
    pub fn from_settings(settings: &LangfuseSettings) -> Option<Self> {
        let public_key = settings.public_key.clone().filter(|k| !k.is_empty())?;
        let secret_key = settings.secret_key.clone().filter(|k| !k.is_empty())?;
        let base_url = settings
            .base_url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Some(Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            public_key,
            secret_key,
        })
    }

    fn prompt_url(&self, name: &str) -> String {
        format!("{}/{}/{}", self.base_url, PROMPTS_API_PATH, name)
    }

    /// Fetch one prompt by name, optionally pinned to a label or version.
    pub fn get_prompt(&self, request: &PromptRequest) -> Result<RemotePrompt, AgentError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(label) = &request.label {
            query.push(("label", label.clone()));
        }
        if let Some(version) = request.version {
            query.push(("version", version.to_string()));
        }

        let response = self
            .http
            .get(self.prompt_url(&request.name))
            .basic_auth(&self.public_key, Some(&self.secret_key))
            .query(&query)
            .send()
            .map_err(|e| AgentError::RemoteError(format!("fetch {}: {}", request.name, e)))?
            .error_for_status()
            .map_err(|e| AgentError::RemoteError(format!("fetch {}: {}", request.name, e)))?;

        response
            .json::<RemotePrompt>()
            .map_err(|e| AgentError::RemoteError(format!("decode {}: {}", request.name, e)))
    }

    /// Create a new prompt version under the given name and label.
    pub fn create_prompt(
        &self,
        name: &str,
        prompt_type: &str,
        prompt: &str,
        label: &str,
    ) -> Result<(), AgentError> {
        let body = serde_json::json!({
            "name": name,
            "type": prompt_type,
            "prompt": prompt,
            "labels": [label],
        });

        self.http
            .post(format!("{}/{}", self.base_url, PROMPTS_API_PATH))
            .basic_auth(&self.public_key, Some(&self.secret_key))
            .json(&body)
            .send()
            .map_err(|e| AgentError::RemoteError(format!("upload {}: {}", name, e)))?
            .error_for_status()
            .map_err(|e| AgentError::RemoteError(format!("upload {}: {}", name, e)))?;
        Ok(())
    }
}

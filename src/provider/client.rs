//! Chat-model invocation.
//!
//! Subagents talk to their model through the `ChatModel` seam; the blocking
//! HTTP implementation targets OpenAI-compatible chat-completions endpoints.

use serde::Deserialize;

use crate::error::AgentError;
use crate::provider::spec::ModelSpec;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// One prompt in, one text response out.
pub trait ChatModel: Send + Sync {
    fn invoke(&self, prompt: &str) -> Result<String, AgentError>;
}

/// Blocking OpenAI-compatible chat-completions client.
pub struct HttpChatModel {
    spec: ModelSpec,
    http: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpChatModel {
    pub fn new(spec: ModelSpec) -> Self {
        Self {
            spec,
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    fn endpoint(&self) -> Result<String, AgentError> {
        let base = match &self.spec.base_url {
            Some(base) if !base.is_empty() => base.trim_end_matches('/').to_string(),
            _ if self.spec.provider == "openai" => OPENAI_BASE_URL.to_string(),
            _ => {
                return Err(AgentError::ModelError(format!(
                    "Provider '{}' requires a base_url (set it in the provider block or override)",
                    self.spec.provider
                )))
            }
        };
        Ok(format!("{}/chat/completions", base))
    }

    fn build_body(&self, prompt: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.spec.model,
            "messages": [{"role": "user", "content": prompt}],
        });
        if let Some(temperature) = self.spec.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(max_tokens) = self.spec.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        body
    }
}

impl ChatModel for HttpChatModel {
    fn invoke(&self, prompt: &str) -> Result<String, AgentError> {
        self.spec
            .validate()
            .map_err(AgentError::ModelError)?;
        let api_key = self.spec.api_key.as_deref().ok_or_else(|| {
            AgentError::ModelError(format!(
                "No API key configured for provider '{}'",
                self.spec.provider
            ))
        })?;

        let mut request = self
            .http
            .post(self.endpoint()?)
            .bearer_auth(api_key)
            .json(&self.build_body(prompt));
        if let Some(organization) = &self.spec.organization {
            request = request.header("OpenAI-Organization", organization);
        }

        let response = request
            .send()
            .map_err(|e| AgentError::ModelError(format!("request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AgentError::ModelError(format!("request failed: {}", e)))?;

        let completion: CompletionResponse = response
            .json()
            .map_err(|e| AgentError::ModelError(format!("decode failed: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AgentError::ModelError("empty completion response".to_string()))
    }
}

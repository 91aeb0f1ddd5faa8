//! Settings schema: typed sections with built-in defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Runtime environment for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnv {
    Dev,
    Test,
    Prod,
}

impl Default for RuntimeEnv {
    fn default() -> Self {
        RuntimeEnv::Dev
    }
}

/// Process-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    #[serde(default)]
    pub env: RuntimeEnv,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            env: RuntimeEnv::default(),
            log_level: default_log_level(),
        }
    }
}

/// Per-provider credential block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// Top-level model selection and defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Credential blocks keyed by provider name.
    #[serde(default)]
    pub providers: BTreeMap<String, LlmProviderSettings>,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            providers: BTreeMap::new(),
        }
    }
}

/// Per-agent model override. All fields optional; an all-`None` override
/// means "inherit the parent agent's resolved model".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl LlmOverride {
    /// True when no field is set, meaning the parent model is reused as-is.
    pub fn is_empty(&self) -> bool {
        self.provider.is_none()
            && self.model.is_none()
            && self.temperature.is_none()
            && self.max_tokens.is_none()
            && self.api_key.is_none()
            && self.base_url.is_none()
            && self.organization.is_none()
    }
}

/// Per-agent configuration patch for model and prompt selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_path: Option<String>,

    #[serde(default)]
    pub model: LlmOverride,
}

/// Prompt-file root and index location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSettings {
    #[serde(default = "default_prompt_root")]
    pub root: String,

    #[serde(default = "default_index_file")]
    pub index_file: String,

    #[serde(default = "default_true")]
    pub langfuse_enabled: bool,
}

fn default_prompt_root() -> String {
    "prompts".to_string()
}

fn default_index_file() -> String {
    "prompts/prompt_index.yaml".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            root: default_prompt_root(),
            index_file: default_index_file(),
            langfuse_enabled: default_true(),
        }
    }
}

/// Remote template service connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LangfuseSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_label")]
    pub label: String,
}

fn default_label() -> String {
    "production".to_string()
}

impl Default for LangfuseSettings {
    fn default() -> Self {
        Self {
            public_key: None,
            secret_key: None,
            base_url: None,
            label: default_label(),
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_vector_store")]
    pub vector_store: String,
}

fn default_vector_store() -> String {
    "memory".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            vector_store: default_vector_store(),
        }
    }
}

/// Config file lists: a generic whole-document list plus per-section paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFileSettings {
    #[serde(default)]
    pub files: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub langfuse: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

/// One fully-merged, immutable settings snapshot for the process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub system: SystemSettings,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub agents: BTreeMap<String, AgentOverride>,

    #[serde(default)]
    pub prompt: PromptSettings,

    #[serde(default)]
    pub langfuse: LangfuseSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub config: ConfigFileSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.system.env, RuntimeEnv::Dev);
        assert_eq!(settings.llm.provider, "openai");
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        assert_eq!(settings.llm.temperature, 0.2);
        assert_eq!(settings.llm.max_tokens, 1024);
        assert_eq!(settings.prompt.root, "prompts");
        assert!(settings.prompt.langfuse_enabled);
        assert_eq!(settings.langfuse.label, "production");
        assert_eq!(settings.storage.vector_store, "memory");
        assert!(settings.agents.is_empty());
    }

    #[test]
    fn test_override_is_empty() {
        assert!(LlmOverride::default().is_empty());

        let with_provider = LlmOverride {
            provider: Some("anthropic".to_string()),
            ..LlmOverride::default()
        };
        assert!(!with_provider.is_empty());

        let with_temperature = LlmOverride {
            temperature: Some(0.0),
            ..LlmOverride::default()
        };
        assert!(!with_temperature.is_empty());
    }

    #[test]
    fn test_agent_override_from_yaml() {
        let yaml = r#"
prompt_group: custom
model:
  provider: anthropic
  model: claude-sonnet-4-5
"#;
        let parsed: AgentOverride = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.prompt_group.as_deref(), Some("custom"));
        assert_eq!(parsed.model.provider.as_deref(), Some("anthropic"));
        assert!(parsed.system_prompt_path.is_none());
    }
}

//! Model specification and construction.
//!
//! Credential backfill order: override-supplied values, then the named
//! provider's credential block, then the top-level llm section. A lookup that
//! finds no provider block is logged and otherwise ignored.

use serde::{Deserialize, Serialize};

use crate::config::{AppSettings, LlmOverride};

/// Concrete model selection handed to a subagent constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub provider: String,
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl ModelSpec {
    /// The base model from the top-level llm section, with credentials
    /// backfilled from the matching provider block.
    pub fn base_from_settings(settings: &AppSettings) -> ModelSpec {
        let llm = &settings.llm;
        let mut spec = ModelSpec {
            provider: llm.provider.clone(),
            model: llm.model.clone(),
            temperature: Some(llm.temperature),
            max_tokens: (llm.max_tokens > 0).then_some(llm.max_tokens),
            api_key: llm.api_key.clone(),
            base_url: None,
            organization: None,
        };
        spec.backfill_provider_block(settings);
        spec
    }

    /// A model from a per-agent override. Fields the override leaves unset
    /// backfill from the named provider's block; when the override names
    /// neither model nor provider, the top-level llm section fills the gaps.
    pub fn from_override(override_: &LlmOverride, settings: &AppSettings) -> ModelSpec {
        let mut spec = ModelSpec {
            provider: override_.provider.clone().unwrap_or_default(),
            model: override_.model.clone().unwrap_or_default(),
            temperature: override_.temperature,
            max_tokens: override_.max_tokens,
            api_key: override_.api_key.clone(),
            base_url: override_.base_url.clone(),
            organization: override_.organization.clone(),
        };

        if !spec.provider.is_empty() {
            spec.backfill_provider_block(settings);
        }

        if override_.model.is_none() || override_.provider.is_none() {
            let llm = &settings.llm;
            if spec.model.is_empty() {
                spec.model = llm.model.clone();
            }
            if spec.provider.is_empty() {
                spec.provider = llm.provider.clone();
            }
            if spec.temperature.is_none() {
                spec.temperature = Some(llm.temperature);
            }
            if spec.max_tokens.is_none() && llm.max_tokens > 0 {
                spec.max_tokens = Some(llm.max_tokens);
            }
            if spec.api_key.is_none() {
                spec.api_key = llm.api_key.clone();
            }
            spec.backfill_provider_block(settings);
        }

        spec
    }

    fn backfill_provider_block(&mut self, settings: &AppSettings) {
        let Some(block) = settings.llm.providers.get(&self.provider) else {
            if !self.provider.is_empty() && !settings.llm.providers.is_empty() {
                tracing::warn!(
                    "No credential block configured for provider '{}'",
                    self.provider
                );
            }
            return;
        };
        if self.api_key.is_none() {
            self.api_key = block.api_key.clone();
        }
        if self.base_url.is_none() {
            self.base_url = block.base_url.clone();
        }
        if self.organization.is_none() {
            self.organization = block.organization.clone();
        }
    }

    /// Validate field ranges before handing the spec to a client.
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!(
                    "Temperature must be between 0.0 and 2.0, got {}",
                    temperature
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProviderSettings;

    fn settings_with_provider_block() -> AppSettings {
        let mut settings = AppSettings::default();
        settings.llm.providers.insert(
            "anthropic".to_string(),
            LlmProviderSettings {
                api_key: Some("k1".to_string()),
                base_url: None,
                organization: None,
            },
        );
        settings
    }

    #[test]
    fn test_base_model_carries_llm_defaults() {
        let settings = AppSettings::default();
        let spec = ModelSpec::base_from_settings(&settings);
        assert_eq!(spec.provider, "openai");
        assert_eq!(spec.model, "gpt-4o-mini");
        assert_eq!(spec.temperature, Some(0.2));
        assert_eq!(spec.max_tokens, Some(1024));
        assert!(spec.api_key.is_none());
    }

    #[test]
    fn test_override_provider_backfills_credentials() {
        let settings = settings_with_provider_block();
        let override_ = LlmOverride {
            provider: Some("anthropic".to_string()),
            ..LlmOverride::default()
        };
        let spec = ModelSpec::from_override(&override_, &settings);
        assert_eq!(spec.provider, "anthropic");
        assert_eq!(spec.api_key.as_deref(), Some("k1"));
        // model left unset by the override: inherited from the llm section
        assert_eq!(spec.model, "gpt-4o-mini");
        assert_eq!(spec.temperature, Some(0.2));
    }

    #[test]
    fn test_override_values_win_over_provider_block() {
        let settings = settings_with_provider_block();
        let override_ = LlmOverride {
            provider: Some("anthropic".to_string()),
            api_key: Some("explicit".to_string()),
            ..LlmOverride::default()
        };
        let spec = ModelSpec::from_override(&override_, &settings);
        assert_eq!(spec.api_key.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_fully_specified_override_skips_llm_backfill() {
        let mut settings = AppSettings::default();
        settings.llm.temperature = 0.9;
        let override_ = LlmOverride {
            provider: Some("openai".to_string()),
            model: Some("gpt-4.1".to_string()),
            ..LlmOverride::default()
        };
        let spec = ModelSpec::from_override(&override_, &settings);
        assert_eq!(spec.model, "gpt-4.1");
        // Both model and provider were explicit: llm defaults stay out.
        assert!(spec.temperature.is_none());
        assert!(spec.max_tokens.is_none());
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        let mut spec = ModelSpec::base_from_settings(&AppSettings::default());
        spec.temperature = Some(3.5);
        assert!(spec.validate().is_err());
        spec.temperature = Some(1.0);
        assert!(spec.validate().is_ok());
    }
}

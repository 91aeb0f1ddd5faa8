//! Environment variable source.
//!
//! A fixed set of `LLM_*` variables overrides top-level llm fields,
//! `LLM_PROVIDERS_<PROVIDER>_<FIELD>` overrides per-provider credential
//! blocks, and `LANGFUSE_*` overrides the remote-template connection block.
//! Malformed numeric values are skipped, keeping the prior value.

use std::collections::BTreeMap;

use crate::config::patch::{LangfusePatch, LlmPatch, ProviderPatch, SettingsPatch};

const PROVIDERS_PREFIX: &str = "LLM_PROVIDERS_";
const PROVIDER_FIELDS: [&str; 3] = ["api_key", "base_url", "organization"];

/// Build the environment contribution from the process environment.
pub fn overrides() -> SettingsPatch {
    overrides_from(std::env::vars())
}

/// Build the environment contribution from an explicit variable set.
pub fn overrides_from(vars: impl Iterator<Item = (String, String)>) -> SettingsPatch {
    let vars: BTreeMap<String, String> = vars.collect();

    let mut llm = LlmPatch::default();
    if let Some(value) = non_empty(&vars, "LLM_PROVIDER") {
        llm.provider = Some(value);
    }
    if let Some(value) = non_empty(&vars, "LLM_MODEL") {
        llm.model = Some(value);
    }
    if let Some(value) = non_empty(&vars, "LLM_TEMPERATURE") {
        match value.parse::<f64>() {
            Ok(parsed) => llm.temperature = Some(parsed),
            Err(_) => tracing::warn!("Ignoring invalid LLM_TEMPERATURE value: {}", value),
        }
    }
    if let Some(value) = non_empty(&vars, "LLM_MAX_TOKENS") {
        match value.parse::<u32>() {
            Ok(parsed) => llm.max_tokens = Some(parsed),
            Err(_) => tracing::warn!("Ignoring invalid LLM_MAX_TOKENS value: {}", value),
        }
    }
    if let Some(value) = non_empty(&vars, "LLM_API_KEY") {
        llm.api_key = Some(value);
    }

    let mut providers: BTreeMap<String, ProviderPatch> = BTreeMap::new();
    for (key, value) in &vars {
        let Some(remainder) = key.strip_prefix(PROVIDERS_PREFIX) else {
            continue;
        };
        let Some((provider_raw, field_raw)) = remainder.split_once('_') else {
            continue;
        };
        let provider = provider_raw.to_lowercase();
        let field = field_raw.to_lowercase();
        if !PROVIDER_FIELDS.contains(&field.as_str()) {
            continue;
        }
        let entry = providers.entry(provider).or_default();
        match field.as_str() {
            "api_key" => entry.api_key = Some(value.clone()),
            "base_url" => entry.base_url = Some(value.clone()),
            "organization" => entry.organization = Some(value.clone()),
            _ => unreachable!(),
        }
    }
    if !providers.is_empty() {
        llm.providers = Some(providers);
    }

    let mut langfuse = LangfusePatch::default();
    if let Some(value) = non_empty(&vars, "LANGFUSE_PUBLIC_KEY") {
        langfuse.public_key = Some(value);
    }
    if let Some(value) = non_empty(&vars, "LANGFUSE_SECRET_KEY") {
        langfuse.secret_key = Some(value);
    }
    if let Some(value) = non_empty(&vars, "LANGFUSE_BASE_URL") {
        langfuse.base_url = Some(value);
    }
    if let Some(value) = non_empty(&vars, "LANGFUSE_LABEL") {
        langfuse.label = Some(value);
    }

    let llm_set = llm.provider.is_some()
        || llm.model.is_some()
        || llm.temperature.is_some()
        || llm.max_tokens.is_some()
        || llm.api_key.is_some()
        || llm.providers.is_some();
    let langfuse_set = langfuse.public_key.is_some()
        || langfuse.secret_key.is_some()
        || langfuse.base_url.is_some()
        || langfuse.label.is_some();

    SettingsPatch {
        llm: llm_set.then_some(llm),
        langfuse: langfuse_set.then_some(langfuse),
        ..SettingsPatch::default()
    }
}

fn non_empty(vars: &BTreeMap<String, String>, name: &str) -> Option<String> {
    vars.get(name).filter(|v| !v.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Iterator<Item = (String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_fixed_llm_overrides() {
        let patch = overrides_from(vars(&[
            ("LLM_PROVIDER", "anthropic"),
            ("LLM_MODEL", "claude-sonnet-4-5"),
            ("LLM_TEMPERATURE", "0.7"),
            ("LLM_MAX_TOKENS", "2048"),
        ]));
        let llm = patch.llm.unwrap();
        assert_eq!(llm.provider.as_deref(), Some("anthropic"));
        assert_eq!(llm.model.as_deref(), Some("claude-sonnet-4-5"));
        assert_eq!(llm.temperature, Some(0.7));
        assert_eq!(llm.max_tokens, Some(2048));
    }

    #[test]
    fn test_malformed_numbers_are_skipped() {
        let patch = overrides_from(vars(&[
            ("LLM_TEMPERATURE", "warm"),
            ("LLM_MAX_TOKENS", "lots"),
            ("LLM_MODEL", "gpt-4o-mini"),
        ]));
        let llm = patch.llm.unwrap();
        assert!(llm.temperature.is_none());
        assert!(llm.max_tokens.is_none());
        assert_eq!(llm.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let patch = overrides_from(vars(&[("LLM_PROVIDER", ""), ("LANGFUSE_LABEL", "")]));
        assert!(patch.is_empty());
    }

    #[test]
    fn test_provider_credential_overrides() {
        let patch = overrides_from(vars(&[
            ("LLM_PROVIDERS_OPENAI_API_KEY", "sk-test"),
            ("LLM_PROVIDERS_ANTHROPIC_BASE_URL", "https://proxy.test"),
            ("LLM_PROVIDERS_OPENAI_UNKNOWN_FIELD", "ignored"),
            ("LLM_PROVIDERS_NOSPLIT", "ignored"),
        ]));
        let providers = patch.llm.unwrap().providers.unwrap();
        assert_eq!(providers["openai"].api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            providers["anthropic"].base_url.as_deref(),
            Some("https://proxy.test")
        );
        assert_eq!(providers.len(), 2);
        assert!(providers["openai"].organization.is_none());
    }

    #[test]
    fn test_langfuse_overrides() {
        let patch = overrides_from(vars(&[
            ("LANGFUSE_PUBLIC_KEY", "pk"),
            ("LANGFUSE_SECRET_KEY", "sk"),
            ("LANGFUSE_LABEL", "staging"),
        ]));
        let langfuse = patch.langfuse.unwrap();
        assert_eq!(langfuse.public_key.as_deref(), Some("pk"));
        assert_eq!(langfuse.secret_key.as_deref(), Some("sk"));
        assert_eq!(langfuse.label.as_deref(), Some("staging"));
        assert!(langfuse.base_url.is_none());
    }
}

//! Field-level settings merge.
//!
//! Every source contributes an all-`Option` patch mirroring the settings
//! schema; `merge` folds a patch into a snapshot by structural recursion over
//! the fixed schema. Present fields replace, absent fields preserve. Agent
//! and provider maps merge per-name and per-field, never wholesale.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::schema::{
    AgentOverride, AppSettings, LangfuseSettings, LlmOverride, LlmProviderSettings, LlmSettings,
    PromptSettings, RuntimeEnv, StorageSettings, SystemSettings,
};

/// One source's contribution to the settings snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    #[serde(default)]
    pub system: Option<SystemPatch>,

    #[serde(default)]
    pub llm: Option<LlmPatch>,

    #[serde(default)]
    pub agents: Option<BTreeMap<String, AgentPatch>>,

    #[serde(default)]
    pub prompt: Option<PromptPatch>,

    #[serde(default)]
    pub langfuse: Option<LangfusePatch>,

    #[serde(default)]
    pub storage: Option<StoragePatch>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.system.is_none()
            && self.llm.is_none()
            && self.agents.is_none()
            && self.prompt.is_none()
            && self.langfuse.is_none()
            && self.storage.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemPatch {
    pub env: Option<RuntimeEnv>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderPatch {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmPatch {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub api_key: Option<String>,
    pub providers: Option<BTreeMap<String, ProviderPatch>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentPatch {
    pub system_prompt_group: Option<String>,
    pub system_prompt_path: Option<String>,
    pub prompt_group: Option<String>,
    pub prompt_path: Option<String>,
    pub model: Option<LlmOverride>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptPatch {
    pub root: Option<String>,
    pub index_file: Option<String>,
    pub langfuse_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LangfusePatch {
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
    pub base_url: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoragePatch {
    pub vector_store: Option<String>,
}

/// Fold one patch into a snapshot, producing a new snapshot.
pub fn merge(base: AppSettings, patch: SettingsPatch) -> AppSettings {
    let mut next = base;
    if let Some(p) = patch.system {
        apply_system(&mut next.system, p);
    }
    if let Some(p) = patch.llm {
        apply_llm(&mut next.llm, p);
    }
    if let Some(p) = patch.agents {
        apply_agents(&mut next.agents, p);
    }
    if let Some(p) = patch.prompt {
        apply_prompt(&mut next.prompt, p);
    }
    if let Some(p) = patch.langfuse {
        apply_langfuse(&mut next.langfuse, p);
    }
    if let Some(p) = patch.storage {
        apply_storage(&mut next.storage, p);
    }
    next
}

fn apply_system(target: &mut SystemSettings, patch: SystemPatch) {
    if let Some(env) = patch.env {
        target.env = env;
    }
    if let Some(level) = patch.log_level {
        target.log_level = level;
    }
}

fn apply_llm(target: &mut LlmSettings, patch: LlmPatch) {
    if let Some(provider) = patch.provider {
        target.provider = provider;
    }
    if let Some(model) = patch.model {
        target.model = model;
    }
    if let Some(temperature) = patch.temperature {
        target.temperature = temperature;
    }
    if let Some(max_tokens) = patch.max_tokens {
        target.max_tokens = max_tokens;
    }
    if let Some(api_key) = patch.api_key {
        target.api_key = Some(api_key);
    }
    if let Some(providers) = patch.providers {
        for (name, provider_patch) in providers {
            let entry = target.providers.entry(name).or_default();
            apply_provider(entry, provider_patch);
        }
    }
}

fn apply_provider(target: &mut LlmProviderSettings, patch: ProviderPatch) {
    if let Some(api_key) = patch.api_key {
        target.api_key = Some(api_key);
    }
    if let Some(base_url) = patch.base_url {
        target.base_url = Some(base_url);
    }
    if let Some(organization) = patch.organization {
        target.organization = Some(organization);
    }
}

fn apply_agents(target: &mut BTreeMap<String, AgentOverride>, patch: BTreeMap<String, AgentPatch>) {
    for (name, agent_patch) in patch {
        let entry = target.entry(name).or_default();
        apply_agent(entry, agent_patch);
    }
}

fn apply_agent(target: &mut AgentOverride, patch: AgentPatch) {
    if let Some(group) = patch.system_prompt_group {
        target.system_prompt_group = Some(group);
    }
    if let Some(path) = patch.system_prompt_path {
        target.system_prompt_path = Some(path);
    }
    if let Some(group) = patch.prompt_group {
        target.prompt_group = Some(group);
    }
    if let Some(path) = patch.prompt_path {
        target.prompt_path = Some(path);
    }
    if let Some(model) = patch.model {
        apply_model_override(&mut target.model, model);
    }
}

fn apply_model_override(target: &mut LlmOverride, patch: LlmOverride) {
    if let Some(provider) = patch.provider {
        target.provider = Some(provider);
    }
    if let Some(model) = patch.model {
        target.model = Some(model);
    }
    if let Some(temperature) = patch.temperature {
        target.temperature = Some(temperature);
    }
    if let Some(max_tokens) = patch.max_tokens {
        target.max_tokens = Some(max_tokens);
    }
    if let Some(api_key) = patch.api_key {
        target.api_key = Some(api_key);
    }
    if let Some(base_url) = patch.base_url {
        target.base_url = Some(base_url);
    }
    if let Some(organization) = patch.organization {
        target.organization = Some(organization);
    }
}

fn apply_prompt(target: &mut PromptSettings, patch: PromptPatch) {
    if let Some(root) = patch.root {
        target.root = root;
    }
    if let Some(index_file) = patch.index_file {
        target.index_file = index_file;
    }
    if let Some(enabled) = patch.langfuse_enabled {
        target.langfuse_enabled = enabled;
    }
}

fn apply_langfuse(target: &mut LangfuseSettings, patch: LangfusePatch) {
    if let Some(public_key) = patch.public_key {
        target.public_key = Some(public_key);
    }
    if let Some(secret_key) = patch.secret_key {
        target.secret_key = Some(secret_key);
    }
    if let Some(base_url) = patch.base_url {
        target.base_url = Some(base_url);
    }
    if let Some(label) = patch.label {
        target.label = label;
    }
}

fn apply_storage(target: &mut StorageSettings, patch: StoragePatch) {
    if let Some(vector_store) = patch.vector_store {
        target.vector_store = vector_store;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn llm_patch(provider: Option<&str>, model: Option<&str>) -> SettingsPatch {
        SettingsPatch {
            llm: Some(LlmPatch {
                provider: provider.map(String::from),
                model: model.map(String::from),
                ..LlmPatch::default()
            }),
            ..SettingsPatch::default()
        }
    }

    #[test]
    fn test_later_patch_dominates_field_level() {
        let settings = merge(AppSettings::default(), llm_patch(Some("anthropic"), None));
        let settings = merge(settings, llm_patch(None, Some("claude-sonnet-4-5")));

        // The second patch left provider unset; the first value survives.
        assert_eq!(settings.llm.provider, "anthropic");
        assert_eq!(settings.llm.model, "claude-sonnet-4-5");
    }

    #[test]
    fn test_agent_merge_is_per_field() {
        let first: BTreeMap<String, AgentPatch> = serde_yaml::from_str(
            r#"
intent:
  model:
    provider: anthropic
"#,
        )
        .unwrap();
        let second: BTreeMap<String, AgentPatch> = serde_yaml::from_str(
            r#"
intent:
  prompt_group: x
"#,
        )
        .unwrap();

        let settings = merge(
            AppSettings::default(),
            SettingsPatch {
                agents: Some(first),
                ..SettingsPatch::default()
            },
        );
        let settings = merge(
            settings,
            SettingsPatch {
                agents: Some(second),
                ..SettingsPatch::default()
            },
        );

        let intent = settings.agents.get("intent").unwrap();
        assert_eq!(intent.prompt_group.as_deref(), Some("x"));
        assert_eq!(intent.model.provider.as_deref(), Some("anthropic"));
    }

    #[test]
    fn test_provider_map_merges_per_provider() {
        let first: LlmPatch = serde_yaml::from_str(
            r#"
providers:
  anthropic:
    api_key: k1
"#,
        )
        .unwrap();
        let second: LlmPatch = serde_yaml::from_str(
            r#"
providers:
  openai:
    base_url: https://example.test/v1
"#,
        )
        .unwrap();

        let settings = merge(
            AppSettings::default(),
            SettingsPatch {
                llm: Some(first),
                ..SettingsPatch::default()
            },
        );
        let settings = merge(
            settings,
            SettingsPatch {
                llm: Some(second),
                ..SettingsPatch::default()
            },
        );

        assert_eq!(
            settings.llm.providers["anthropic"].api_key.as_deref(),
            Some("k1")
        );
        assert_eq!(
            settings.llm.providers["openai"].base_url.as_deref(),
            Some("https://example.test/v1")
        );
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let base = merge(AppSettings::default(), llm_patch(Some("anthropic"), None));
        let merged = merge(base.clone(), SettingsPatch::default());
        assert_eq!(merged.llm.provider, base.llm.provider);
        assert_eq!(merged.llm.model, base.llm.model);
    }

    proptest! {
        // Later sources strictly dominate earlier ones at the field level,
        // and an unset later field never clears an earlier value.
        #[test]
        fn prop_last_set_value_wins(first in "[a-z]{1,12}", second in proptest::option::of("[a-z]{1,12}")) {
            let settings = merge(AppSettings::default(), llm_patch(Some(&first), None));
            let settings = merge(settings, llm_patch(second.as_deref(), None));
            match second {
                Some(value) => prop_assert_eq!(settings.llm.provider, value),
                None => prop_assert_eq!(settings.llm.provider, first),
            }
        }
    }
}

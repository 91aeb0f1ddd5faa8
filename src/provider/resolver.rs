//! Agent Configuration Adapter.
//!
//! Maps the settings snapshot's per-agent overrides into the concrete
//! (model, prompt-source) pair a subagent constructor consumes. An absent or
//! all-empty override reuses the shared base model instance.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::AppSettings;
use crate::prompt::PromptResolver;
use crate::provider::spec::ModelSpec;

/// Where a subagent's prompt text comes from: an explicit file path wins over
/// the named group at invocation time.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSource {
    pub group: String,
    pub path: Option<PathBuf>,
}

/// Resolves per-agent model and prompt configuration.
pub struct AgentConfigResolver {
    settings: Arc<AppSettings>,
    base_model: Arc<ModelSpec>,
}

impl AgentConfigResolver {
    pub fn new(settings: Arc<AppSettings>, base_model: Arc<ModelSpec>) -> Self {
        Self {
            settings,
            base_model,
        }
    }

    pub fn base_model(&self) -> Arc<ModelSpec> {
        self.base_model.clone()
    }

    /// The model spec for an agent. The base instance is shared unless the
    /// agent's override sets at least one model field.
    pub fn resolve_model(&self, agent_name: &str) -> Arc<ModelSpec> {
        match self.settings.agents.get(agent_name) {
            Some(override_) if !override_.model.is_empty() => {
                Arc::new(ModelSpec::from_override(&override_.model, &self.settings))
            }
            _ => self.base_model.clone(),
        }
    }

    /// The prompt source for an agent. The group defaults to the agent's own
    /// name when the override supplies neither a group nor a path.
    pub fn resolve_prompt_source(&self, agent_name: &str) -> PromptSource {
        match self.settings.agents.get(agent_name) {
            Some(override_) => PromptSource {
                group: override_
                    .prompt_group
                    .clone()
                    .or_else(|| override_.system_prompt_group.clone())
                    .unwrap_or_else(|| agent_name.to_string()),
                path: override_
                    .prompt_path
                    .clone()
                    .or_else(|| override_.system_prompt_path.clone())
                    .map(PathBuf::from),
            },
            None => PromptSource {
                group: agent_name.to_string(),
                path: None,
            },
        }
    }

    /// Final prompt text for an agent: direct file read when a path is
    /// configured, group resolution otherwise.
    pub fn resolve_prompt(
        &self,
        agent_name: &str,
        prompts: &PromptResolver,
        variables: Option<&HashMap<String, String>>,
    ) -> String {
        let source = self.resolve_prompt_source(agent_name);
        render_source(&source, prompts, variables)
    }
}

/// Render a prompt source: the explicit path when it has content, the group
/// otherwise.
pub fn render_source(
    source: &PromptSource,
    prompts: &PromptResolver,
    variables: Option<&HashMap<String, String>>,
) -> String {
    if let Some(path) = &source.path {
        if let Some(text) = prompts.render_file(Path::new(path), variables) {
            return text;
        }
    }
    prompts.build_prompt(&source.group, variables)
}

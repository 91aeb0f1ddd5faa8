//! Top-level robot agent.
//!
//! Wires the three subagents from the settings snapshot: the base model comes
//! from the `robot-agent` override (or the top-level llm section), each
//! subagent's model and prompt source come from the Agent Configuration
//! Adapter, and one command runs the pipeline to completion on the calling
//! thread.

use std::collections::HashMap;
use std::sync::Arc;

use crate::agent::execution::ExecutionAgent;
use crate::agent::intent::IntentAgent;
use crate::agent::perception::PerceptionAgent;
use crate::config::{AgentOverride, AppSettings};
use crate::prompt::PromptResolver;
use crate::provider::{
    render_source, AgentConfigResolver, ChatModel, HttpChatModel, ModelSpec, PromptSource,
};

const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a robot control agent. Use subagents for intent, perception, and execution planning.";

/// The top-level orchestrator.
pub struct RobotAgent {
    intent: IntentAgent,
    perception: PerceptionAgent,
    execution: ExecutionAgent,
    system_prompt: String,
}

impl RobotAgent {
    /// Build from settings with live HTTP chat models.
    pub fn new(settings: Arc<AppSettings>) -> Self {
        Self::build(settings, true, None)
    }

    /// Build without any model wiring; subagents run purely on heuristics.
    pub fn heuristic_only(settings: Arc<AppSettings>) -> Self {
        Self::build(settings, false, None)
    }

    /// Build with an explicit system prompt, bypassing configured selection.
    pub fn with_system_prompt(settings: Arc<AppSettings>, system_prompt: String) -> Self {
        Self::build(settings, true, Some(system_prompt))
    }

    fn build(settings: Arc<AppSettings>, with_models: bool, system_prompt: Option<String>) -> Self {
        let prompts = Arc::new(PromptResolver::new(&settings));
        let main_config = Self::main_override(&settings);

        let base_spec = if main_config.model.is_empty() {
            ModelSpec::base_from_settings(&settings)
        } else {
            ModelSpec::from_override(&main_config.model, &settings)
        };
        let adapter = AgentConfigResolver::new(settings.clone(), Arc::new(base_spec));

        let subagent_model = |name: &str| -> Option<Arc<dyn ChatModel>> {
            if !with_models {
                return None;
            }
            let spec = adapter.resolve_model(name);
            Some(Arc::new(HttpChatModel::new((*spec).clone())))
        };

        let intent = IntentAgent::new(
            subagent_model("intent"),
            prompts.clone(),
            adapter.resolve_prompt_source("intent"),
        );
        let perception = PerceptionAgent::new(
            subagent_model("perception"),
            prompts.clone(),
            adapter.resolve_prompt_source("perception"),
        );
        let execution = ExecutionAgent::new(
            subagent_model("execution"),
            prompts.clone(),
            adapter.resolve_prompt_source("execution"),
        );

        let system_prompt = system_prompt
            .or_else(|| Self::configured_system_prompt(&main_config, &prompts))
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        tracing::debug!("System prompt selected ({} chars)", system_prompt.len());

        Self {
            intent,
            perception,
            execution,
            system_prompt,
        }
    }

    fn main_override(settings: &AppSettings) -> AgentOverride {
        settings
            .agents
            .get("robot-agent")
            .or_else(|| settings.agents.get("robot_agent"))
            .cloned()
            .unwrap_or_default()
    }

    fn configured_system_prompt(
        main_config: &AgentOverride,
        prompts: &PromptResolver,
    ) -> Option<String> {
        let path = main_config
            .prompt_path
            .clone()
            .or_else(|| main_config.system_prompt_path.clone());
        let group = main_config
            .prompt_group
            .clone()
            .or_else(|| main_config.system_prompt_group.clone());
        if path.is_none() && group.is_none() {
            return None;
        }

        let source = PromptSource {
            group: group.unwrap_or_default(),
            path: path.map(Into::into),
        };
        if source.path.is_none() && source.group.is_empty() {
            return None;
        }
        let variables: HashMap<String, String> = HashMap::new();
        let text = render_source(&source, prompts, Some(&variables));
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Interpret one natural-language command: classify, perceive, plan, and
    /// compose the response text.
    pub fn handle(&self, text: &str) -> String {
        tracing::info!("Interpreting command: {}", text);
        let intent = self.intent.classify(text);
        let perception = self.perception.perceive(text);
        let execution = self.execution.plan(text);
        format!(
            "{}\n{}\n{}",
            intent.output, perception.output, execution.output
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_system_prompt() {
        let agent = RobotAgent::heuristic_only(Arc::new(AppSettings::default()));
        assert_eq!(agent.system_prompt(), DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_handle_composes_three_sections() {
        let agent = RobotAgent::heuristic_only(Arc::new(AppSettings::default()));
        let response = agent.handle("pick up the bottle from the table");
        let lines: Vec<&str> = response.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("intent=pick"));
        assert!(lines[1].contains("bottle"));
        assert!(lines[1].contains("on a table"));
        assert!(lines[2].starts_with("plan="));
    }

    #[test]
    fn test_explicit_system_prompt_wins() {
        let agent = RobotAgent::with_system_prompt(
            Arc::new(AppSettings::default()),
            "Custom controller.".to_string(),
        );
        assert_eq!(agent.system_prompt(), "Custom controller.");
    }
}

//! Execution planning subagent.

use std::sync::Arc;

use crate::agent::common::{extract_json_object, normalize_text, string_list};
use crate::prompt::PromptResolver;
use crate::provider::{ChatModel, PromptSource};

/// Plan steps and low-level actions for one command.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub plan: Vec<String>,
    pub actions: Vec<String>,
    pub output: String,
}

const PICK_WORDS: [&str; 6] = ["抓", "取", "拿", "拾取", "pick", "grab"];
const PLACE_WORDS: [&str; 6] = ["放", "放置", "放下", "place", "put", "drop"];
const MOVE_WORDS: [&str; 4] = ["移动", "去", "move", "go"];
const STOP_WORDS: [&str; 6] = ["停止", "急停", "停下", "stop", "halt", "emergency"];

/// Generates execution plans and low-level actions.
pub struct ExecutionAgent {
    model: Option<Arc<dyn ChatModel>>,
    prompts: Arc<PromptResolver>,
    source: PromptSource,
}

impl ExecutionAgent {
    pub fn new(
        model: Option<Arc<dyn ChatModel>>,
        prompts: Arc<PromptResolver>,
        source: PromptSource,
    ) -> Self {
        Self {
            model,
            prompts,
            source,
        }
    }

    pub fn plan(&self, input: &str) -> ExecutionResult {
        let (mut plan, mut actions) = Self::heuristic_plan(input);

        if let Some(model) = &self.model {
            if let Some(refined) = self.model_plan(model.as_ref(), input) {
                if let Some(list) = refined.get("plan").and_then(string_list) {
                    plan = list;
                }
                if let Some(list) = refined.get("actions").and_then(string_list) {
                    actions = list;
                }
            }
        }

        let output = format!("plan={:?}; actions={:?}", plan, actions);
        ExecutionResult {
            plan,
            actions,
            output,
        }
    }

    fn model_plan(
        &self,
        model: &dyn ChatModel,
        input: &str,
    ) -> Option<serde_json::Map<String, serde_json::Value>> {
        let prompt =
            super::common::subagent_prompt(&self.prompts, &self.source, "execution", input);
        match model.invoke(&prompt) {
            Ok(response) => extract_json_object(&response),
            Err(e) => {
                tracing::debug!(
                    "Execution model call failed, keeping heuristic result: {}",
                    e
                );
                None
            }
        }
    }

    fn heuristic_plan(text: &str) -> (Vec<String>, Vec<String>) {
        let lower = normalize_text(text);
        let to_strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        if PICK_WORDS.iter().any(|word| lower.contains(word)) {
            return (
                to_strings(&["locate target", "move above target", "close gripper", "lift"]),
                to_strings(&["scan", "approach", "grip", "lift"]),
            );
        }
        if PLACE_WORDS.iter().any(|word| lower.contains(word)) {
            return (
                to_strings(&["move to placement", "lower", "open gripper", "retract"]),
                to_strings(&["approach", "lower", "release", "retreat"]),
            );
        }
        if MOVE_WORDS.iter().any(|word| lower.contains(word)) {
            return (
                to_strings(&["plan path", "move along path", "verify pose"]),
                to_strings(&["plan", "move", "check"]),
            );
        }
        if STOP_WORDS.iter().any(|word| lower.contains(word)) {
            return (
                to_strings(&["halt motion", "set safe state", "confirm stop"]),
                to_strings(&["halt", "safe", "confirm"]),
            );
        }
        (
            to_strings(&["request clarification"]),
            to_strings(&["ask"]),
        )
    }
}

//! Intent classification subagent.

use std::sync::Arc;

use crate::agent::common::{extract_json_object, normalize_text, pick_first_str, string_list};
use crate::prompt::PromptResolver;
use crate::provider::{ChatModel, PromptSource};

/// Classification outcome for one command.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentResult {
    pub intent: String,
    pub confidence: f64,
    pub entities: Vec<String>,
    pub output: String,
}

const PICK_WORDS: [&str; 7] = ["抓", "取", "拿", "拾取", "pick", "grab", "grip"];
const PLACE_WORDS: [&str; 6] = ["放", "放置", "放下", "place", "put", "drop"];
const MOVE_WORDS: [&str; 5] = ["移动", "去", "move", "go", "reach"];
const STOP_WORDS: [&str; 6] = ["停止", "急停", "停下", "stop", "halt", "emergency"];

/// Identifies user intent for robot commands.
pub struct IntentAgent {
    model: Option<Arc<dyn ChatModel>>,
    prompts: Arc<PromptResolver>,
    source: PromptSource,
}

impl IntentAgent {
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

    pub fn classify(&self, input: &str) -> IntentResult {
        let (mut intent, mut confidence, mut entities) = Self::heuristic_intent(input);

        if let Some(model) = &self.model {
            if let Some(refined) = self.model_intent(model.as_ref(), input) {
                if let Some(value) = refined.get("intent") {
                    let picked = pick_first_str(value);
                    if !picked.is_empty() {
                        intent = picked;
                    }
                }
                if let Some(value) = refined.get("confidence").and_then(|v| v.as_f64()) {
                    confidence = value;
                }
                if let Some(list) = refined.get("entities").and_then(string_list) {
                    entities = list;
                }
            }
        }

        let output = format!(
            "intent={}; confidence={:.2}; entities={:?}",
            intent, confidence, entities
        );
        IntentResult {
            intent,
            confidence,
            entities,
            output,
        }
    }

    fn model_intent(
        &self,
        model: &dyn ChatModel,
        input: &str,
    ) -> Option<serde_json::Map<String, serde_json::Value>> {
        let prompt = super::common::subagent_prompt(&self.prompts, &self.source, "intent", input);
        match model.invoke(&prompt) {
            Ok(response) => extract_json_object(&response),
            Err(e) => {
                tracing::debug!("Intent model call failed, keeping heuristic result: {}", e);
                None
            }
        }
    }

    fn heuristic_intent(text: &str) -> (String, f64, Vec<String>) {
        let lower = normalize_text(text);
        let entities: Vec<String> = Vec::new();
        if PICK_WORDS.iter().any(|word| lower.contains(word)) {
            return ("pick".to_string(), 0.62, entities);
        }
        if PLACE_WORDS.iter().any(|word| lower.contains(word)) {
            return ("place".to_string(), 0.6, entities);
        }
        if MOVE_WORDS.iter().any(|word| lower.contains(word)) {
            return ("move".to_string(), 0.55, entities);
        }
        if STOP_WORDS.iter().any(|word| lower.contains(word)) {
            return ("stop".to_string(), 0.9, entities);
        }
        ("unknown".to_string(), 0.3, entities)
    }
}

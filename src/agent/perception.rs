//! Scene perception subagent.

use std::sync::Arc;

use crate::agent::common::{extract_json_object, normalize_text, pick_first_str, string_list};
use crate::prompt::PromptResolver;
use crate::provider::{ChatModel, PromptSource};

/// Perceived objects and scene cue for one command.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptionResult {
    pub objects: Vec<String>,
    pub scene: String,
    pub output: String,
}

const KNOWN_OBJECTS: [&str; 10] = [
    "杯子", "瓶子", "盒子", "螺丝", "螺母", "apple", "bottle", "box", "bolt", "nut",
];
const TABLE_WORDS: [&str; 3] = ["桌", "table", "desk"];
const FLOOR_WORDS: [&str; 3] = ["地", "floor", "ground"];

/// Extracts objects and scene cues from commands or context.
pub struct PerceptionAgent {
    model: Option<Arc<dyn ChatModel>>,
    prompts: Arc<PromptResolver>,
    source: PromptSource,
}

impl PerceptionAgent {
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

    pub fn perceive(&self, input: &str) -> PerceptionResult {
        let (mut objects, mut scene) = Self::heuristic_perception(input);

        if let Some(model) = &self.model {
            if let Some(refined) = self.model_perception(model.as_ref(), input) {
                if let Some(list) = refined.get("objects").and_then(string_list) {
                    objects = list;
                }
                if let Some(value) = refined.get("scene") {
                    let picked = pick_first_str(value);
                    if !picked.is_empty() {
                        scene = picked;
                    }
                }
            }
        }

        let output = format!("objects={:?}; scene={}", objects, scene);
        PerceptionResult {
            objects,
            scene,
            output,
        }
    }

    fn model_perception(
        &self,
        model: &dyn ChatModel,
        input: &str,
    ) -> Option<serde_json::Map<String, serde_json::Value>> {
        let prompt =
            super::common::subagent_prompt(&self.prompts, &self.source, "perception", input);
        match model.invoke(&prompt) {
            Ok(response) => extract_json_object(&response),
            Err(e) => {
                tracing::debug!(
                    "Perception model call failed, keeping heuristic result: {}",
                    e
                );
                None
            }
        }
    }

    fn heuristic_perception(text: &str) -> (Vec<String>, String) {
        let lower = normalize_text(text);
        let objects: Vec<String> = KNOWN_OBJECTS
            .iter()
            .filter(|item| lower.contains(*item))
            .map(|item| item.to_string())
            .collect();

        let mut scene = "unknown scene".to_string();
        if TABLE_WORDS.iter().any(|word| lower.contains(word)) {
            scene = "on a table".to_string();
        }
        if FLOOR_WORDS.iter().any(|word| lower.contains(word)) {
            scene = "on the floor".to_string();
        }
        (objects, scene)
    }
}

//! Shared subagent helpers: model-output parsing and prompt assembly.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::prompt::PromptResolver;
use crate::provider::{render_source, PromptSource};

/// Extract the first JSON object embedded in model output. The scan is
/// greedy: first `{` to last `}`, tolerating surrounding prose.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Lowercased, trimmed text for keyword matching.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Coerce a JSON value to a trimmed string; null becomes empty.
pub fn pick_first_str(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Coerce a JSON array to its non-empty string items.
pub fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(pick_first_str)
            .filter(|item| !item.is_empty())
            .collect(),
    )
}

/// Build a subagent's prompt: the configured file path when it has content,
/// the group (or the agent's default) otherwise, with `{input}` bound.
pub fn subagent_prompt(
    prompts: &PromptResolver,
    source: &PromptSource,
    default_group: &str,
    input: &str,
) -> String {
    let mut variables = HashMap::new();
    variables.insert("input".to_string(), input.to_string());

    let source = if source.group.is_empty() {
        PromptSource {
            group: default_group.to_string(),
            path: source.path.clone(),
        }
    } else {
        source.clone()
    };
    render_source(&source, prompts, Some(&variables))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_with_prose() {
        let text = "Sure! Here you go:\n{\"intent\": \"pick\", \"confidence\": 0.9}\nDone.";
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["intent"], "pick");
    }

    #[test]
    fn test_extract_json_object_rejects_non_objects() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("[1, 2, 3]").is_none());
        assert!(extract_json_object("{broken").is_none());
    }

    #[test]
    fn test_pick_first_str() {
        assert_eq!(pick_first_str(&Value::Null), "");
        assert_eq!(pick_first_str(&Value::String("  cup ".to_string())), "cup");
        assert_eq!(pick_first_str(&serde_json::json!(3)), "3");
    }

    #[test]
    fn test_string_list_filters_empties() {
        let value = serde_json::json!(["cup", "", "  ", "box"]);
        assert_eq!(string_list(&value).unwrap(), vec!["cup", "box"]);
        assert!(string_list(&serde_json::json!("not a list")).is_none());
    }
}

//! YAML file sources.
//!
//! A missing, unreadable, or malformed file yields an empty contribution; the
//! failure is logged and the pipeline continues with the prior snapshot.

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::patch::{
    AgentPatch, LangfusePatch, LlmPatch, PromptPatch, SettingsPatch, StoragePatch, SystemPatch,
};

/// Settings sections addressable by a section-specific file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    System,
    Llm,
    Agents,
    Prompt,
    Langfuse,
    Storage,
}

impl Section {
    pub fn key(&self) -> &'static str {
        match self {
            Section::System => "system",
            Section::Llm => "llm",
            Section::Agents => "agents",
            Section::Prompt => "prompt",
            Section::Langfuse => "langfuse",
            Section::Storage => "storage",
        }
    }
}

fn read_yaml_mapping(path: &Path) -> Option<serde_yaml::Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Skipping unreadable config file {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_yaml::from_str::<serde_yaml::Value>(&content) {
        Ok(value) if value.is_mapping() => Some(value),
        Ok(_) => {
            tracing::warn!(
                "Skipping config file {}: top level is not a mapping",
                path.display()
            );
            None
        }
        Err(e) => {
            tracing::warn!("Skipping malformed config file {}: {}", path.display(), e);
            None
        }
    }
}

fn parse_value<T: DeserializeOwned>(value: serde_yaml::Value, path: &Path) -> Option<T> {
    match serde_yaml::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(
                "Dropping contribution from config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

/// Whole-document contribution: any subset of the known sections.
pub fn document_patch(path: &Path) -> SettingsPatch {
    let Some(value) = read_yaml_mapping(path) else {
        return SettingsPatch::default();
    };
    parse_value(value, path).unwrap_or_default()
}

/// Section-scoped contribution. A top-level key matching the section name
/// wins; otherwise the whole document body is treated as that section's data.
pub fn section_patch(path: &Path, section: Section) -> SettingsPatch {
    let Some(value) = read_yaml_mapping(path) else {
        return SettingsPatch::default();
    };

    let nested = match &value {
        serde_yaml::Value::Mapping(mapping) => {
            let key = serde_yaml::Value::String(section.key().to_string());
            match mapping.get(&key) {
                Some(nested) if nested.is_mapping() => Some(nested.clone()),
                _ => None,
            }
        }
        _ => None,
    };
    let body = nested.unwrap_or(value);

    let mut patch = SettingsPatch::default();
    match section {
        Section::System => {
            patch.system = parse_value::<SystemPatch>(body, path);
        }
        Section::Llm => {
            patch.llm = parse_value::<LlmPatch>(body, path);
        }
        Section::Agents => {
            patch.agents = parse_value::<BTreeMap<String, AgentPatch>>(body, path);
        }
        Section::Prompt => {
            patch.prompt = parse_value::<PromptPatch>(body, path);
        }
        Section::Langfuse => {
            patch.langfuse = parse_value::<LangfusePatch>(body, path);
        }
        Section::Storage => {
            patch.storage = parse_value::<StoragePatch>(body, path);
        }
    }
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_empty_contribution() {
        let patch = document_patch(Path::new("/nonexistent/robotagent.yaml"));
        assert!(patch.is_empty());
    }

    #[test]
    fn test_malformed_file_is_empty_contribution() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.yaml", "llm: [not: valid: yaml");
        assert!(document_patch(&path).is_empty());
    }

    #[test]
    fn test_document_patch_reads_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "config.yaml",
            "llm:\n  provider: anthropic\nstorage:\n  vector_store: memory\n",
        );
        let patch = document_patch(&path);
        assert_eq!(
            patch.llm.as_ref().unwrap().provider.as_deref(),
            Some("anthropic")
        );
        assert_eq!(
            patch.storage.as_ref().unwrap().vector_store.as_deref(),
            Some("memory")
        );
        assert!(patch.system.is_none());
    }

    #[test]
    fn test_section_patch_prefers_nested_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "llm.yaml", "llm:\n  model: claude-sonnet-4-5\n");
        let patch = section_patch(&path, Section::Llm);
        assert_eq!(
            patch.llm.as_ref().unwrap().model.as_deref(),
            Some("claude-sonnet-4-5")
        );
    }

    #[test]
    fn test_section_patch_accepts_whole_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "llm.yaml", "model: gpt-4.1\ntemperature: 0.5\n");
        let patch = section_patch(&path, Section::Llm);
        let llm = patch.llm.as_ref().unwrap();
        assert_eq!(llm.model.as_deref(), Some("gpt-4.1"));
        assert_eq!(llm.temperature, Some(0.5));
    }

    #[test]
    fn test_agents_section_whole_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "agents.yaml", "intent:\n  prompt_group: custom\n");
        let patch = section_patch(&path, Section::Agents);
        let agents = patch.agents.as_ref().unwrap();
        assert_eq!(
            agents.get("intent").unwrap().prompt_group.as_deref(),
            Some("custom")
        );
    }
}

//! Prompt index: group name -> section files and optional remote binding.
//!
//! The index is loaded fresh from disk on every resolution call so edits to
//! prompt files take effect without a restart.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Section names concatenated, in this order, when no single-file prompt is
/// configured for a group.
pub const DEFAULT_SECTIONS: [&str; 4] = ["system", "task", "output", "examples"];

/// Index key for a single-file prompt.
pub const SINGLE_FILE_KEY: &str = "prompt";

/// Remote template binding for a prompt group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub prompt_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_seconds: Option<u64>,
}

/// One prompt group's section map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PromptGroup {
    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub task: Option<String>,

    #[serde(default)]
    pub output: Option<String>,

    #[serde(default)]
    pub examples: Option<String>,

    /// Single-file prompt; when present and readable it replaces the sections.
    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default)]
    pub langfuse: Option<RemoteBinding>,
}

impl PromptGroup {
    pub fn section(&self, name: &str) -> Option<&str> {
        match name {
            "system" => self.system.as_deref(),
            "task" => self.task.as_deref(),
            "output" => self.output.as_deref(),
            "examples" => self.examples.as_deref(),
            SINGLE_FILE_KEY => self.prompt.as_deref(),
            _ => None,
        }
    }
}

/// The prompt index document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptIndex {
    /// Prompt-file root override, relative to the resolver's base directory.
    #[serde(default)]
    pub root: Option<String>,

    #[serde(default)]
    pub prompts: BTreeMap<String, PromptGroup>,
}

impl PromptIndex {
    /// Load the index from a file. A missing or malformed index yields an
    /// empty one; parse failures are logged.
    pub fn load(path: &Path) -> PromptIndex {
        if !path.exists() {
            return PromptIndex::default();
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read prompt index {}: {}", path.display(), e);
                return PromptIndex::default();
            }
        };
        match serde_yaml::from_str(&content) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("Malformed prompt index {}: {}", path.display(), e);
                PromptIndex::default()
            }
        }
    }

    /// Group names, sorted.
    pub fn group_names(&self) -> Vec<String> {
        self.prompts.keys().cloned().collect()
    }
}

/// Resolve a section file path. An explicit index entry is taken relative to
/// the root (absolute entries pass through); otherwise the conventional
/// `<root>/<group>/<section>.md` location applies.
pub fn section_path(root: &Path, group: &str, group_map: &PromptGroup, section: &str) -> PathBuf {
    if let Some(rel) = group_map.section(section) {
        let rel_path = Path::new(rel);
        if rel_path.is_absolute() {
            return rel_path.to_path_buf();
        }
        return root.join(rel_path);
    }
    root.join(group).join(format!("{}.md", section))
}

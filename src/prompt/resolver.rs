//! Prompt resolution: an ordered strategy chain.
//!
//! Strategies are tried in a fixed order until one yields text: the remote
//! template service first, local section files second. Remote failures fall
//! through silently; missing local files contribute empty content.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::{AppSettings, LangfuseSettings, PromptSettings};
use crate::prompt::index::{
    section_path, PromptGroup, PromptIndex, DEFAULT_SECTIONS, SINGLE_FILE_KEY,
};
use crate::prompt::langfuse::{LangfuseClient, PromptRequest, RemotePrompt};
use crate::prompt::template;

/// Resolution strategies, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    RemoteTemplate,
    LocalFiles,
}

const STRATEGY_ORDER: [Strategy; 2] = [Strategy::RemoteTemplate, Strategy::LocalFiles];

/// Resolves named prompt groups to final prompt text.
///
/// The index and prompt files are re-read on every call; only the remote
/// client handle is cached for the resolver's lifetime.
pub struct PromptResolver {
    prompt: PromptSettings,
    langfuse: LangfuseSettings,
    base_dir: PathBuf,
    client: OnceLock<Option<LangfuseClient>>,
}

impl PromptResolver {
    /// Resolver rooted at the current working directory.
    pub fn new(settings: &AppSettings) -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_base_dir(settings, base_dir)
    }

    /// Resolver with an explicit base directory for relative paths.
    pub fn with_base_dir(settings: &AppSettings, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompt: settings.prompt.clone(),
            langfuse: settings.langfuse.clone(),
            base_dir: base_dir.into(),
            client: OnceLock::new(),
        }
    }

    /// Final prompt text for a group. Never fails: with no remote service and
    /// no local files the result is empty.
    pub fn build_prompt(
        &self,
        group: &str,
        variables: Option<&HashMap<String, String>>,
    ) -> String {
        let index = self.load_index();
        for strategy in STRATEGY_ORDER {
            match strategy {
                Strategy::RemoteTemplate => {
                    if let Some(text) = self.render_remote(&index, group, variables) {
                        return text;
                    }
                }
                Strategy::LocalFiles => {
                    let joined = self.build_local(&index, group);
                    return match variables {
                        Some(variables) => template::render(&joined, variables),
                        None => joined,
                    };
                }
            }
        }
        String::new()
    }

    /// Remote-only rendering, used by administrative export.
    pub fn render_remote_prompt(
        &self,
        group: &str,
        variables: Option<&HashMap<String, String>>,
    ) -> Option<String> {
        let index = self.load_index();
        self.render_remote(&index, group, variables)
    }

    /// Read a prompt file directly, bypassing group resolution. Returns
    /// `None` when the file is missing or blank.
    pub fn render_file(
        &self,
        path: &Path,
        variables: Option<&HashMap<String, String>>,
    ) -> Option<String> {
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        let content = std::fs::read_to_string(&resolved).ok()?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match variables {
            Some(variables) => template::render(trimmed, variables),
            None => trimmed.to_string(),
        })
    }

    /// The current index, re-read from disk.
    pub fn load_index(&self) -> PromptIndex {
        PromptIndex::load(&self.resolve(&self.prompt.index_file))
    }

    pub(crate) fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Prompt-file root: the configured root wins over the index's own.
    pub(crate) fn prompt_root(&self, index: &PromptIndex) -> PathBuf {
        if !self.prompt.root.is_empty() {
            return self.resolve(&self.prompt.root);
        }
        if let Some(root) = &index.root {
            return self.resolve(root);
        }
        self.base_dir.join("prompts")
    }

    /// The configured default label for remote prompt lookups.
    pub(crate) fn default_label(&self) -> Option<String> {
        if self.langfuse.label.is_empty() {
            None
        } else {
            Some(self.langfuse.label.clone())
        }
    }

    /// The remote client handle, constructed once. `None` when the service is
    /// disabled or credentials are missing.
    pub(crate) fn client(&self) -> Option<&LangfuseClient> {
        self.client
            .get_or_init(|| {
                if !self.prompt.langfuse_enabled {
                    return None;
                }
                LangfuseClient::from_settings(&self.langfuse)
            })
            .as_ref()
    }

    fn render_remote(
        &self,
        index: &PromptIndex,
        group: &str,
        variables: Option<&HashMap<String, String>>,
    ) -> Option<String> {
        let client = self.client()?;
        let group_map = index.prompts.get(group)?;
        let binding = group_map.langfuse.as_ref()?;

        let name = binding.name.clone().unwrap_or_else(|| group.to_string());
        if name.is_empty() {
            return None;
        }
        let request = PromptRequest {
            name,
            label: binding.label.clone().or_else(|| self.default_label()),
            version: binding.version,
        };

        let fallback_group = binding.fallback_group.as_deref().unwrap_or(group);
        let fallback_map = index.prompts.get(fallback_group).unwrap_or(group_map);
        let fallback = self.assemble_group(index, fallback_group, fallback_map);

        let remote = match client.get_prompt(&request) {
            Ok(remote) => remote,
            Err(e) => {
                tracing::debug!("Remote prompt fetch failed for {}: {}", request.name, e);
                if fallback.is_empty() {
                    return None;
                }
                RemotePrompt::from_fallback(template::to_remote_template(&fallback))
            }
        };

        let empty = HashMap::new();
        let compiled = remote.compile(variables.unwrap_or(&empty));
        if compiled.is_empty() {
            None
        } else {
            Some(compiled)
        }
    }

    /// Local text for a group: the single-file prompt when configured and
    /// present, otherwise the existing non-empty sections joined by blank
    /// lines.
    pub(crate) fn build_local(&self, index: &PromptIndex, group: &str) -> String {
        let default_map = PromptGroup::default();
        let group_map = index.prompts.get(group).unwrap_or(&default_map);
        self.assemble_group(index, group, group_map)
    }

    fn assemble_group(&self, index: &PromptIndex, group: &str, group_map: &PromptGroup) -> String {
        let root = self.prompt_root(index);

        if group_map.prompt.is_some() {
            let single = section_path(&root, group, group_map, SINGLE_FILE_KEY);
            if let Ok(content) = std::fs::read_to_string(&single) {
                return content.trim().to_string();
            }
        }

        let mut parts: Vec<String> = Vec::new();
        for section in DEFAULT_SECTIONS {
            let path = section_path(&root, group, group_map, section);
            if let Ok(content) = std::fs::read_to_string(&path) {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
        }
        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppSettings;
    use std::fs;

    fn settings_for(dir: &Path) -> AppSettings {
        let mut settings = AppSettings::default();
        settings.prompt.root = dir.join("prompts").to_string_lossy().into_owned();
        settings.prompt.index_file = dir
            .join("prompts/prompt_index.yaml")
            .to_string_lossy()
            .into_owned();
        settings
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_local_sections_join_in_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("prompts/prompt_index.yaml"),
            "prompts:\n  intent: {}\n",
        );
        write(&dir.path().join("prompts/intent/task.md"), "Classify.\n");
        write(&dir.path().join("prompts/intent/output.md"), "Return JSON.\n");

        let settings = settings_for(dir.path());
        let resolver = PromptResolver::with_base_dir(&settings, dir.path());
        assert_eq!(
            resolver.build_prompt("intent", None),
            "Classify.\n\nReturn JSON."
        );
    }

    #[test]
    fn test_single_file_prompt_wins_over_sections() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("prompts/prompt_index.yaml"),
            "prompts:\n  intent:\n    prompt: intent/all.md\n",
        );
        write(&dir.path().join("prompts/intent/all.md"), "Everything.\n");
        write(&dir.path().join("prompts/intent/task.md"), "Ignored.\n");

        let settings = settings_for(dir.path());
        let resolver = PromptResolver::with_base_dir(&settings, dir.path());
        assert_eq!(resolver.build_prompt("intent", None), "Everything.");
    }

    #[test]
    fn test_unknown_group_without_files_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(dir.path());
        let resolver = PromptResolver::with_base_dir(&settings, dir.path());
        assert_eq!(resolver.build_prompt("nope", None), "");
    }

    #[test]
    fn test_substitution_applies_to_local_content() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("prompts/prompt_index.yaml"),
            "prompts:\n  intent: {}\n",
        );
        write(
            &dir.path().join("prompts/intent/task.md"),
            "Handle: {input} at {place}\n",
        );

        let settings = settings_for(dir.path());
        let resolver = PromptResolver::with_base_dir(&settings, dir.path());
        let mut variables = HashMap::new();
        variables.insert("input".to_string(), "pick up the cup".to_string());
        assert_eq!(
            resolver.build_prompt("intent", Some(&variables)),
            "Handle: pick up the cup at {place}"
        );
    }

    #[test]
    fn test_build_prompt_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("prompts/prompt_index.yaml"),
            "prompts:\n  intent: {}\n",
        );
        write(&dir.path().join("prompts/intent/task.md"), "Classify.\n");

        let settings = settings_for(dir.path());
        let resolver = PromptResolver::with_base_dir(&settings, dir.path());
        let first = resolver.build_prompt("intent", None);
        let second = resolver.build_prompt("intent", None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_credentials_falls_through_to_local() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("prompts/prompt_index.yaml"),
            "prompts:\n  intent:\n    langfuse:\n      name: robot-intent\n",
        );
        write(&dir.path().join("prompts/intent/task.md"), "Classify.\n");

        let settings = settings_for(dir.path());
        let resolver = PromptResolver::with_base_dir(&settings, dir.path());
        assert!(resolver.client().is_none());
        assert_eq!(resolver.build_prompt("intent", None), "Classify.");
    }

    #[test]
    fn test_index_root_used_when_settings_root_empty() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("prompts/prompt_index.yaml"),
            "root: alt\nprompts:\n  intent: {}\n",
        );
        write(&dir.path().join("alt/intent/task.md"), "From alt.\n");

        let mut settings = settings_for(dir.path());
        settings.prompt.root = String::new();
        let resolver = PromptResolver::with_base_dir(&settings, dir.path());
        assert_eq!(resolver.build_prompt("intent", None), "From alt.");
    }

    #[test]
    fn test_render_file_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(dir.path());
        let resolver = PromptResolver::with_base_dir(&settings, dir.path());
        assert!(resolver
            .render_file(Path::new("missing.md"), None)
            .is_none());
    }
}

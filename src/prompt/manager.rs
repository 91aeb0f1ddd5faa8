//! Prompt administration: list, push, and pull.
//!
//! Unlike resolution, these operations surface failures: a missing client or
//! an unknown group is operator-actionable misconfiguration.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::AgentError;
use crate::prompt::index::RemoteBinding;
use crate::prompt::resolver::PromptResolver;
use crate::prompt::template;

const DEFAULT_PROMPT_TYPE: &str = "text";

/// Options for `upload_group`.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub label: Option<String>,
    pub prompt_type: Option<String>,
    pub name: Option<String>,
    pub dry_run: bool,
}

/// One row of the group listing.
#[derive(Debug, Clone)]
pub struct GroupListing {
    pub group: String,
    pub name: String,
    pub label: String,
    pub prompt_type: String,
    pub binding: Option<RemoteBinding>,
}

/// Administrative service borrowing a resolver.
pub struct PromptAdminService<'a> {
    resolver: &'a PromptResolver,
}

impl<'a> PromptAdminService<'a> {
    pub fn new(resolver: &'a PromptResolver) -> Self {
        Self { resolver }
    }

    /// Groups from the index with their effective remote name/label/type.
    pub fn list_groups(&self) -> Vec<GroupListing> {
        let index = self.resolver.load_index();
        index
            .prompts
            .iter()
            .map(|(group, group_map)| {
                let binding = group_map.langfuse.clone();
                let spec = binding.clone().unwrap_or_default();
                GroupListing {
                    group: group.clone(),
                    name: spec.name.unwrap_or_else(|| group.clone()),
                    label: spec
                        .label
                        .or_else(|| self.resolver.default_label())
                        .unwrap_or_else(|| "production".to_string()),
                    prompt_type: spec
                        .prompt_type
                        .unwrap_or_else(|| DEFAULT_PROMPT_TYPE.to_string()),
                    binding,
                }
            })
            .collect()
    }

    /// Push one group's local content to the remote service.
    pub fn upload_group(&self, group: &str, options: &UploadOptions) -> Result<String, AgentError> {
        let client = self.resolver.client().ok_or_else(|| {
            AgentError::RemoteUnavailable(
                "public/secret key not configured; check LANGFUSE_PUBLIC_KEY and LANGFUSE_SECRET_KEY"
                    .to_string(),
            )
        })?;

        let index = self.resolver.load_index();
        let group_map = index
            .prompts
            .get(group)
            .ok_or_else(|| AgentError::UnknownPromptGroup(group.to_string()))?;
        let spec = group_map.langfuse.clone().unwrap_or_default();

        let prompt_text = self.resolver.build_local(&index, group);
        if prompt_text.is_empty() {
            return Err(AgentError::PromptError(format!(
                "Prompt group '{}' has no content to upload",
                group
            )));
        }

        let name = options
            .name
            .clone()
            .or(spec.name)
            .unwrap_or_else(|| group.to_string());
        let label = options
            .label
            .clone()
            .or(spec.label)
            .or_else(|| self.resolver.default_label())
            .unwrap_or_else(|| "production".to_string());
        let prompt_type = options
            .prompt_type
            .clone()
            .or(spec.prompt_type)
            .unwrap_or_else(|| DEFAULT_PROMPT_TYPE.to_string());
        let rendered = template::to_remote_template(&prompt_text);

        if options.dry_run {
            return Ok(format!(
                "[dry-run] {} -> name={} label={} type={}",
                group, name, label, prompt_type
            ));
        }

        client.create_prompt(&name, &prompt_type, &rendered, &label)?;
        Ok(format!("[ok] uploaded {} -> {} ({})", group, name, label))
    }

    /// Render one group via the remote service only and write it to disk.
    pub fn export_group(
        &self,
        group: &str,
        variables: Option<&HashMap<String, String>>,
        output_path: Option<PathBuf>,
    ) -> Result<PathBuf, AgentError> {
        if self.resolver.client().is_none() {
            return Err(AgentError::RemoteUnavailable(
                "public/secret key not configured; cannot export".to_string(),
            ));
        }

        let rendered = self
            .resolver
            .render_remote_prompt(group, variables)
            .ok_or_else(|| {
                AgentError::RemoteError(format!(
                    "Failed to render prompt group '{}' from the remote template service",
                    group
                ))
            })?;

        let output_path = output_path.unwrap_or_else(|| {
            let index = self.resolver.load_index();
            self.resolver
                .prompt_root(&index)
                .join(group)
                .join("langfuse.md")
        });

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgentError::PromptError(format!(
                    "Failed to create export directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        std::fs::write(&output_path, format!("{}\n", rendered.trim())).map_err(|e| {
            AgentError::PromptError(format!(
                "Failed to write export file {}: {}",
                output_path.display(),
                e
            ))
        })?;
        Ok(output_path)
    }
}

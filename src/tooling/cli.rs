//! CLI Tooling
//!
//! Command-line interface for interpreting commands, managing prompt
//! templates, and inspecting the merged settings snapshot.

use clap::{Parser, Subcommand};
use comfy_table::Table;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::RobotAgent;
use crate::config::{init_settings, load_settings, AppSettings, ConfigFileSettings};
use crate::error::AgentError;
use crate::prompt::{PromptAdminService, PromptResolver, UploadOptions};

/// Robotagent CLI - natural-language robot command interpretation
#[derive(Parser)]
#[command(name = "robotagent")]
#[command(about = "Multi-agent natural-language robot command interpreter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Extra configuration file (whole-document merge, repeatable)
    #[arg(long = "config")]
    pub config: Vec<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log file path (used when ROBOTAGENT_LOG_OUTPUT=file)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interpret one natural-language command
    Run {
        /// The command text
        text: String,
        /// Skip model calls and answer from heuristics only
        #[arg(long)]
        heuristic_only: bool,
    },
    /// Prompt template management
    Prompts {
        #[command(subcommand)]
        command: PromptCommands,
    },
    /// Show the merged settings snapshot
    Settings {
        /// Output format (yaml or json)
        #[arg(long, default_value = "yaml")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum PromptCommands {
    /// List prompt groups and their remote bindings
    List {
        /// Show the full remote binding for each group
        #[arg(long)]
        details: bool,
    },
    /// Upload local prompt files to the remote template service
    Push {
        /// Only upload these prompt groups (repeatable)
        #[arg(long = "group")]
        groups: Vec<String>,
        /// Override the prompt label
        #[arg(long)]
        label: Option<String>,
        /// Override the prompt type
        #[arg(long = "type")]
        prompt_type: Option<String>,
        /// Override the prompt name
        #[arg(long)]
        name: Option<String>,
        /// Print actions without uploading
        #[arg(long)]
        dry_run: bool,
    },
    /// Export rendered prompt content from the remote template service
    Pull {
        /// Prompt group name
        group: String,
        /// Output file path
        #[arg(long)]
        out: Option<PathBuf>,
        /// JSON object of template variables
        #[arg(long)]
        vars: Option<String>,
    },
}

/// Execution context holding the settings snapshot.
pub struct CliContext {
    settings: Arc<AppSettings>,
}

impl CliContext {
    /// Load settings: defaults, configured files, extra --config files, env.
    pub fn new(extra_config: &[PathBuf], log_level: Option<String>) -> Result<Self, AgentError> {
        let base_dir = std::env::current_dir()
            .map_err(|e| AgentError::ConfigError(format!("Failed to get current dir: {}", e)))?;

        let mut sources = ConfigFileSettings::default();
        for path in extra_config {
            sources.files.push(path.to_string_lossy().into_owned());
        }

        let mut settings = load_settings(&sources, &base_dir);
        if let Some(level) = log_level {
            settings.system.log_level = level;
        }
        Ok(Self {
            settings: init_settings(settings),
        })
    }

    pub fn settings(&self) -> Arc<AppSettings> {
        self.settings.clone()
    }

    pub fn execute(&self, command: &Commands) -> Result<String, AgentError> {
        match command {
            Commands::Run {
                text,
                heuristic_only,
            } => {
                let agent = if *heuristic_only {
                    RobotAgent::heuristic_only(self.settings())
                } else {
                    RobotAgent::new(self.settings())
                };
                Ok(agent.handle(text))
            }
            Commands::Prompts { command } => self.execute_prompts(command),
            Commands::Settings { format } => self.show_settings(format),
        }
    }

    fn execute_prompts(&self, command: &PromptCommands) -> Result<String, AgentError> {
        let resolver = PromptResolver::new(&self.settings);
        let service = PromptAdminService::new(&resolver);

        match command {
            PromptCommands::List { details } => {
                let listings = service.list_groups();
                if listings.is_empty() {
                    return Ok("No prompt groups found.".to_string());
                }
                if *details {
                    let lines: Vec<String> = listings
                        .iter()
                        .map(|listing| {
                            format!("{}: {:?}", listing.group, listing.binding)
                        })
                        .collect();
                    return Ok(lines.join("\n"));
                }
                let mut table = Table::new();
                table.set_header(vec!["Group", "Name", "Label", "Type"]);
                for listing in &listings {
                    table.add_row(vec![
                        listing.group.clone(),
                        listing.name.clone(),
                        listing.label.clone(),
                        listing.prompt_type.clone(),
                    ]);
                }
                Ok(table.to_string())
            }
            PromptCommands::Push {
                groups,
                label,
                prompt_type,
                name,
                dry_run,
            } => {
                let listings = service.list_groups();
                let selected: Vec<String> = listings
                    .iter()
                    .map(|listing| listing.group.clone())
                    .filter(|group| groups.is_empty() || groups.contains(group))
                    .collect();
                if selected.is_empty() {
                    return Ok("No prompt groups selected.".to_string());
                }

                let options = UploadOptions {
                    label: label.clone(),
                    prompt_type: prompt_type.clone(),
                    name: name.clone(),
                    dry_run: *dry_run,
                };
                let mut lines = Vec::with_capacity(selected.len());
                for group in &selected {
                    lines.push(service.upload_group(group, &options)?);
                }
                Ok(lines.join("\n"))
            }
            PromptCommands::Pull { group, out, vars } => {
                let variables = match vars {
                    Some(raw) => Some(parse_variables(raw)?),
                    None => None,
                };
                let path = service.export_group(group, variables.as_ref(), out.clone())?;
                Ok(format!("[ok] exported to {}", path.display()))
            }
        }
    }

    fn show_settings(&self, format: &str) -> Result<String, AgentError> {
        match format {
            "json" => serde_json::to_string_pretty(self.settings.as_ref())
                .map_err(|e| AgentError::ConfigError(format!("Failed to render settings: {}", e))),
            "yaml" => serde_yaml::to_string(self.settings.as_ref())
                .map_err(|e| AgentError::ConfigError(format!("Failed to render settings: {}", e))),
            other => Err(AgentError::ConfigError(format!(
                "Invalid settings format: {} (must be 'yaml' or 'json')",
                other
            ))),
        }
    }
}

fn parse_variables(raw: &str) -> Result<HashMap<String, String>, AgentError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| AgentError::ConfigError(format!("Invalid --vars JSON: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| AgentError::ConfigError("--vars must be a JSON object".to_string()))?;
    Ok(object
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect())
}

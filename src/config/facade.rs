//! Settings loading facade.
//!
//! Orchestrates the merge pipeline: built-in defaults, then each generic-list
//! file as a whole-document merge, then each section-specific file, then the
//! environment overlay. The process-wide snapshot is built once and memoized;
//! tests and embedders construct loaders explicitly instead.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use super::patch::merge;
use super::schema::{AppSettings, ConfigFileSettings};
use super::sources::environment;
use super::sources::files::{document_patch, section_patch, Section};

/// Settings loader bound to a base directory for relative config paths.
pub struct SettingsLoader {
    base_dir: PathBuf,
}

impl SettingsLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Loader rooted at the current working directory.
    pub fn from_cwd() -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(base_dir)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Build one snapshot: defaults -> files -> environment.
    pub fn load(&self, sources: &ConfigFileSettings) -> AppSettings {
        let mut settings = AppSettings {
            config: sources.clone(),
            ..AppSettings::default()
        };

        for file in &sources.files {
            settings = merge(settings, document_patch(&self.resolve(file)));
        }

        let section_files = [
            (Section::System, &sources.system),
            (Section::Llm, &sources.llm),
            (Section::Agents, &sources.agents),
            (Section::Prompt, &sources.prompt),
            (Section::Langfuse, &sources.langfuse),
            (Section::Storage, &sources.storage),
        ];
        for (section, file) in section_files {
            if let Some(file) = file {
                settings = merge(settings, section_patch(&self.resolve(file), section));
            }
        }

        merge(settings, environment::overrides())
    }
}

/// Load a snapshot with an explicit source list and base directory.
pub fn load_settings(sources: &ConfigFileSettings, base_dir: &Path) -> AppSettings {
    SettingsLoader::new(base_dir).load(sources)
}

static SETTINGS: OnceLock<Arc<AppSettings>> = OnceLock::new();

/// The process-wide settings snapshot, built on first access and cached.
/// Repeated calls return the identical snapshot.
pub fn get_settings() -> Arc<AppSettings> {
    SETTINGS
        .get_or_init(|| Arc::new(SettingsLoader::from_cwd().load(&ConfigFileSettings::default())))
        .clone()
}

/// Install an explicitly-loaded snapshot as the process-wide one. Returns the
/// installed snapshot, or the existing one if the cell was already populated.
pub fn init_settings(settings: AppSettings) -> Arc<AppSettings> {
    SETTINGS.get_or_init(|| Arc::new(settings)).clone()
}

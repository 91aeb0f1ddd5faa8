//! Layered settings pipeline.
//!
//! Built-in defaults, YAML config files, and environment variables merge into
//! one immutable settings snapshot. Later sources dominate earlier ones at the
//! field level; an unset field never clears an earlier value.

pub mod facade;
pub mod patch;
pub mod schema;
pub mod sources;

pub use facade::{get_settings, init_settings, load_settings, SettingsLoader};
pub use patch::{merge, SettingsPatch};
pub use schema::{
    AgentOverride, AppSettings, ConfigFileSettings, LangfuseSettings, LlmOverride,
    LlmProviderSettings, LlmSettings, PromptSettings, RuntimeEnv, StorageSettings,
    SystemSettings,
};

//! Logging System
//!
//! Structured logging via the `tracing` crate, configured from the `system`
//! settings section with environment-variable overrides.

use crate::config::SystemSettings;
use crate::error::AgentError;
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Resolve the log file path with precedence: explicit argument,
/// ROBOTAGENT_LOG_FILE env, platform state directory default.
pub fn resolve_log_file_path(explicit: Option<PathBuf>) -> Result<PathBuf, AgentError> {
    if let Some(path) = explicit {
        if !path.as_os_str().is_empty() {
            return Ok(path);
        }
    }
    if let Ok(env_path) = std::env::var("ROBOTAGENT_LOG_FILE") {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    let project_dirs = directories::ProjectDirs::from("", "robotagent", "robotagent")
        .ok_or_else(|| {
            AgentError::ConfigError(
                "Could not determine platform state directory for log file".to_string(),
            )
        })?;
    let state_dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_dir());
    Ok(state_dir.join("robotagent.log"))
}

/// Initialize the logging system.
///
/// The filter comes from ROBOTAGENT_LOG when set, otherwise from the system
/// section's log_level. ROBOTAGENT_LOG_FORMAT selects json or text;
/// ROBOTAGENT_LOG_OUTPUT selects stderr (default) or file, so command output
/// stays clean on stdout either way.
pub fn init_logging(
    system: Option<&SystemSettings>,
    log_file: Option<PathBuf>,
) -> Result<(), AgentError> {
    let filter = build_env_filter(system)?;
    let format = determine_format()?;
    let output = determine_output()?;

    let base_subscriber = Registry::default().with(filter);
    match (format.as_str(), output.as_str()) {
        ("json", "file") => {
            let file_writer = open_log_file(log_file)?;
            base_subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_writer(file_writer),
                )
                .init();
        }
        ("json", _) => {
            base_subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        (_, "file") => {
            let file_writer = open_log_file(log_file)?;
            base_subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(false)
                        .with_writer(file_writer),
                )
                .init();
        }
        _ => {
            base_subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
    Ok(())
}

fn open_log_file(explicit: Option<PathBuf>) -> Result<std::fs::File, AgentError> {
    let log_file = resolve_log_file_path(explicit)?;
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AgentError::ConfigError(format!("Failed to create log directory: {}", e))
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .map_err(|e| {
            AgentError::ConfigError(format!("Failed to open log file {:?}: {}", log_file, e))
        })
}

fn build_env_filter(system: Option<&SystemSettings>) -> Result<EnvFilter, AgentError> {
    if let Ok(filter) = EnvFilter::try_from_env("ROBOTAGENT_LOG") {
        return Ok(filter);
    }
    let level = system.map(|s| s.log_level.as_str()).unwrap_or("info");
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }
    EnvFilter::try_new(level)
        .map_err(|e| AgentError::ConfigError(format!("Invalid log level '{}': {}", level, e)))
}

fn determine_format() -> Result<String, AgentError> {
    let format = match std::env::var("ROBOTAGENT_LOG_FORMAT") {
        Ok(format) if !format.is_empty() => format,
        _ => "text".to_string(),
    };
    if format != "json" && format != "text" {
        return Err(AgentError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }
    Ok(format)
}

fn determine_output() -> Result<String, AgentError> {
    let output = match std::env::var("ROBOTAGENT_LOG_OUTPUT") {
        Ok(output) if !output.is_empty() => output,
        _ => "stderr".to_string(),
    };
    if output != "stderr" && output != "file" {
        return Err(AgentError::ConfigError(format!(
            "Invalid log output: {} (must be 'stderr' or 'file')",
            output
        )));
    }
    Ok(output)
}

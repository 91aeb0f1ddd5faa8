//! Crate-wide error type.
//!
//! Environmental failures (missing files, unreachable services) are recovered
//! close to where they occur and logged; only operator-actionable
//! misconfiguration surfaces through these variants.

use thiserror::Error;

/// Errors surfaced by robotagent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Configuration is malformed in a way the operator must fix.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Prompt content could not be read or assembled.
    #[error("Prompt error: {0}")]
    PromptError(String),

    /// A prompt group named in a request is absent from the prompt index.
    #[error("Unknown prompt group: {0}")]
    UnknownPromptGroup(String),

    /// The remote template service is not configured or not constructible.
    #[error("Remote template service unavailable: {0}")]
    RemoteUnavailable(String),

    /// A remote call failed after the client was constructed.
    #[error("Remote template service error: {0}")]
    RemoteError(String),

    /// Model invocation failed; callers degrade to their heuristic path.
    #[error("Model error: {0}")]
    ModelError(String),

    /// The configured vector-store type is not in the supported set.
    #[error("Unsupported vector store type: {requested}. Supported types are: {supported}")]
    UnsupportedVectorStore { requested: String, supported: String },

    /// Document loading failed.
    #[error("Failed to load document: {0}")]
    DocumentError(String),
}

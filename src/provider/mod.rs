//! Model providers.
//!
//! A `ModelSpec` is the concrete model selection handed to subagent
//! constructors; the adapter resolves one per agent name from the settings
//! snapshot, and the chat client turns a spec into live completions.

pub mod client;
pub mod resolver;
pub mod spec;

pub use client::{ChatModel, HttpChatModel};
pub use resolver::{render_source, AgentConfigResolver, PromptSource};
pub use spec::ModelSpec;

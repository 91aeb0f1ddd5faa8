//! Subagents and the top-level orchestrator.
//!
//! Each subagent computes a heuristic result first and lets its model, when
//! one responds with a parseable JSON object, refine it. Model failures never
//! surface; the heuristic result stands.

pub mod common;
pub mod execution;
pub mod intent;
pub mod orchestrator;
pub mod perception;

pub use execution::{ExecutionAgent, ExecutionResult};
pub use intent::{IntentAgent, IntentResult};
pub use orchestrator::RobotAgent;
pub use perception::{PerceptionAgent, PerceptionResult};

//! Prompt resolution.
//!
//! Final prompt text for a named group comes from the remote template service
//! when one is configured and bound, and from local section files otherwise.
//! Variable substitution is safe: unknown placeholders stay verbatim.

pub mod index;
pub mod langfuse;
pub mod manager;
pub mod resolver;
pub mod template;

pub use index::{PromptGroup, PromptIndex, RemoteBinding};
pub use manager::{GroupListing, PromptAdminService, UploadOptions};
pub use resolver::PromptResolver;

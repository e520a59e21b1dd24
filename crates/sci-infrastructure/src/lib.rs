//! # Infrastructure Layer
//!
//! Configuration loading and validation, the process-wide resource context,
//! the prompt library, and logging bootstrap. This crate is the composition
//! root: it resolves providers from the linkme registries and wires the
//! application services together.

/// Typed configuration and its loader
pub mod config;
/// Process-wide resource context
pub mod context;
/// Logging bootstrap
pub mod logging;
/// Prompt library loaded from a YAML text file
pub mod prompts;

pub use config::{AppConfig, ConfigLoader};
pub use context::AppContext;
pub use prompts::PromptLibraryImpl;

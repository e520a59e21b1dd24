//! Registered analysis, business, and visualization components.
//!
//! Each component is a thin, stateless wrapper over one or two retrieval or
//! LLM calls, registered in the component table under `(domain, name)` and
//! constructed with explicit dependencies.

/// SOLID violations, architecture compliance, existence, suggestions
pub mod analysis;
/// Business-logic extraction
pub mod business;
/// Diagram generators
pub mod visualization;

//! Analysis Component Registry
//!
//! Compile-time registration table mapping `(domain, name)` to a component
//! factory. Replaces runtime filesystem scanning: late-bound creation of a
//! component given its name is a table lookup, and dependency injection is
//! explicit through [`ComponentDeps`].

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::ports::services::{AnalysisComponent, ComponentDeps};

/// Registry entry for an analysis component.
pub struct ComponentEntry {
    /// Component domain (e.g., "analysis", "visualization", "business")
    pub domain: &'static str,
    /// Component name within its domain
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Constructor receiving the shared resources
    pub build: fn(&ComponentDeps) -> std::result::Result<Arc<dyn AnalysisComponent>, String>,
}

#[linkme::distributed_slice]
/// Registered analysis components, populated at link time.
pub static ANALYSIS_COMPONENTS: [ComponentEntry] = [..];

/// Resolve a component by `(domain, name)`.
///
/// # Errors
///
/// Returns an error if no component is registered under the pair or if its
/// constructor fails.
pub fn resolve_component(
    domain: &str,
    name: &str,
    deps: &ComponentDeps,
) -> Result<Arc<dyn AnalysisComponent>> {
    for entry in ANALYSIS_COMPONENTS {
        if entry.domain == domain && entry.name == name {
            return (entry.build)(deps).map_err(|e| Error::Config {
                message: e,
                source: None,
            });
        }
    }

    Err(Error::not_found(format!("component {domain}/{name}")))
}

/// List all registered components as `(domain, name, description)` rows.
pub fn list_components() -> Vec<(&'static str, &'static str, &'static str)> {
    ANALYSIS_COMPONENTS
        .iter()
        .map(|e| (e.domain, e.name, e.description))
        .collect()
}

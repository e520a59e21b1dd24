//! # Domain Layer
//!
//! Core business logic and domain types for semantic code intelligence.
//! Contains only pure domain entities, value objects, ports, and the
//! provider registration tables.
//!
//! ## Architecture
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`entities`] | Core business entities (documents, nodes, triplets, manifests) |
//! | [`value_objects`] | Immutable value objects (ids, embeddings, search results) |
//! | [`ports`] | External provider and service port interfaces |
//! | [`registry`] | Compile-time provider registration tables |
//! | [`error`] | Domain error types |
//!
//! ## Clean Architecture Principles
//!
//! - **Entities** are at the center with business rules
//! - **Value Objects** are immutable and compared by value
//! - **Ports** describe what the outside world must provide, never how
//! - **No infrastructure concerns** - providers implement the ports elsewhere

/// Common macros
#[macro_use]
pub mod macros;

/// Core business entities
pub mod entities;
/// Domain error types
pub mod error;
/// External provider and service port interfaces
pub mod ports;
/// Provider auto-registration registries
pub mod registry;
/// Common utilities
pub mod utils;
/// Immutable value objects
pub mod value_objects;

pub use entities::*;
pub use error::{Error, Result};
pub use utils::compute_content_hash;
pub use value_objects::*;

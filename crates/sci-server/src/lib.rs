//! # Transport Layer
//!
//! Ultra-thin transports over the core: every HTTP route, MCP tool, and CLI
//! command is a one- or two-line delegate to an [`AppContext`] operation.
//!
//! [`AppContext`]: sci_infrastructure::AppContext

/// Git hook installation for auto-docs
pub mod auto_docs;
/// Clap command tree
pub mod cli;
/// Axum HTTP transport
pub mod http;
/// rmcp stdio transport
pub mod mcp;

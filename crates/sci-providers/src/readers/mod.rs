//! Document readers.
//!
//! Polymorphic over [`sci_domain::ports::providers::DocumentReader`]: each
//! variant produces a sequence of documents from one kind of source and
//! registers itself in the reader registry.

/// JSONL and console-export conversation files
pub mod conversation;
/// Recursive directory walker
pub mod directory;
/// GitHub repository documentation subtrees
pub mod github;
/// Single URL fetcher
pub mod url;
/// Breadth-first site crawler
pub mod web;

pub use conversation::ConversationReader;
pub use directory::DirectoryReader;
pub use github::GitHubReader;
pub use url::UrlReader;
pub use web::WebCrawlReader;

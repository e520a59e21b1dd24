//! Clap command tree.
//!
//! Each subcommand is a thin delegate to a core operation; output is JSON
//! or plain text on stdout, exit code 0 on success and 1 on failure.

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sci_domain::ports::services::{
    AnalysisComponent, ComponentRequest, PromptLibrary, RetrievalServiceInterface,
};
use sci_domain::value_objects::CollectionId;
use sci_infrastructure::AppContext;
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Semantic code intelligence service.
#[derive(Parser)]
#[command(name = "sci", version, about = "Semantic code intelligence service")]
pub struct Cli {
    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// All CLI operations.
#[derive(Subcommand)]
pub enum Command {
    /// Index a directory tree as a project
    Index {
        /// Directory to index
        path: String,
        /// Project name
        name: String,
        /// vector, graph, hybrid, or auto
        #[arg(long)]
        mode: Option<String>,
    },
    /// Incrementally refresh an indexed project
    Refresh {
        /// Directory to reconcile against
        path: String,
        /// Project name
        name: String,
    },
    /// Search an indexed project
    Search {
        /// Natural-language query
        query: String,
        /// Project name
        project: String,
        /// Maximum results to retrieve
        #[arg(long, default_value_t = 5)]
        limit: usize,
        /// Include ranked source citations
        #[arg(long)]
        citations: bool,
    },
    /// Route a query to the best collection automatically
    Smart {
        /// Natural-language query
        query: String,
    },
    /// Scan a project for SOLID violations
    Violations {
        /// Project name
        project: String,
    },
    /// Suggest libraries for a task
    Suggest {
        /// Task description
        task: String,
    },
    /// Answer a multi-part question with sub-question decomposition
    Complex {
        /// Natural-language question
        query: String,
        /// Project name
        project: String,
    },
    /// Index framework documentation
    IndexDocs {
        /// Framework name
        framework: String,
        /// Optional documentation URL override
        #[arg(long)]
        url: Option<String>,
    },
    /// Search framework documentation
    SearchDocs {
        /// Natural-language query
        query: String,
        /// Framework name
        framework: String,
    },
    /// Ask for a minimal working example from documentation
    Howto {
        /// What to do
        query: String,
        /// Framework name
        #[arg(long, default_value = "llamaindex")]
        framework: String,
    },
    /// List indexed documentation frameworks
    ListDocs,
    /// Check whether a component exists in a project
    Exists {
        /// Component, class, or function name
        component: String,
        /// Project name
        project: String,
    },
    /// Generate a diagram of an indexed project
    Diagram {
        /// Project name
        project: String,
        /// mermaid, plantuml, sequence, or structural
        #[arg(long, default_value = "mermaid")]
        format: String,
    },
    /// Extract business logic from an indexed project
    Business {
        /// Project name
        project: String,
    },
    /// Index a JSONL conversation stream
    IndexConversations {
        /// JSONL file path
        path: String,
        /// Target collection
        #[arg(long, default_value = "conversations")]
        collection: String,
    },
    /// Check whether an action would violate coding guidelines
    CheckViolation {
        /// Proposed action
        action: String,
        /// Surrounding context
        #[arg(long, default_value = "")]
        context: String,
    },
    /// Start the HTTP transport
    Run,
    /// Start the MCP stdio transport
    Mcp,
    /// Report service health
    Health,
}

/// Execute one command against the shared context.
///
/// # Errors
///
/// Propagates core errors; the binary maps them to exit code 1.
pub async fn execute(ctx: Arc<AppContext>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Index { path, name, mode } => {
            let collection = ctx.project_collection(&name)?;
            let mode = mode.as_deref().map(str::parse).transpose()?;
            let outcome = ctx.indexing()?.index_project(&path, &collection, mode).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Refresh { path, name } => {
            let collection = ctx.project_collection(&name)?;
            let outcome = ctx.indexing()?.refresh_project(&path, &collection).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Search {
            query,
            project,
            limit,
            citations,
        } => {
            let collection = ctx.project_collection(&project)?;
            if citations {
                let cited = ctx
                    .retrieval()?
                    .search_with_citations(&query, &collection, limit)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&cited)?);
            } else {
                println!("{}", ctx.retrieval()?.search(&query, &collection, limit).await?);
            }
        }
        Command::Smart { query } => {
            println!("{}", ctx.retrieval()?.smart_query(&query, None).await?);
        }
        Command::Violations { project } => {
            let collection = ctx.project_collection(&project)?;
            let output = ctx
                .component("analysis", "violations")?
                .run(&ComponentRequest::for_target(collection.as_str()))
                .await?;
            for finding in output.into_items() {
                println!("- {finding}");
            }
        }
        Command::Suggest { task } => {
            let output = ctx
                .component("analysis", "suggestions")?
                .run(&ComponentRequest::for_target(&task))
                .await?;
            println!("{}", output.into_items().join("\n"));
        }
        Command::Complex { query, project } => {
            let collection = ctx.project_collection(&project)?;
            println!(
                "{}",
                ctx.retrieval()?.answer_complex(&query, &[collection]).await?
            );
        }
        Command::IndexDocs { framework, url } => {
            let outcome = ctx.docs()?.index_framework(&framework, url.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::SearchDocs { query, framework } => {
            println!("{}", ctx.docs()?.search_pattern(&query, &framework).await?);
        }
        Command::Howto { query, framework } => {
            let prompted = ctx
                .prompts()?
                .render("docs", "howto", &[("query", query.as_str())])
                .unwrap_or_else(|| query.clone());
            println!("{}", ctx.docs()?.search_pattern(&prompted, &framework).await?);
        }
        Command::ListDocs => {
            for framework in ctx.docs()?.list_frameworks().await? {
                println!("{framework}");
            }
        }
        Command::Exists { component, project } => {
            let collection = ctx.project_collection(&project)?;
            let report = ctx.retrieval()?.exists(&component, &collection).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Diagram { project, format } => {
            let collection = ctx.project_collection(&project)?;
            let output = ctx
                .component("visualization", &format)?
                .run(&ComponentRequest::for_target(collection.as_str()))
                .await?;
            println!("{}", output.into_items().join("\n"));
        }
        Command::Business { project } => {
            let collection = ctx.project_collection(&project)?;
            let output = ctx
                .component("business", "extraction")?
                .run(&ComponentRequest::for_target(collection.as_str()))
                .await?;
            match output {
                sci_domain::ports::services::ComponentOutput::Json(value) => {
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                other => println!("{}", other.into_items().join("\n")),
            }
        }
        Command::IndexConversations { path, collection } => {
            let collection = CollectionId::from(collection.as_str());
            let conversations = ctx.conversations()?;
            // .json files are console exports; everything else is JSONL.
            let outcome = if path.ends_with(".json") {
                conversations.index_export(&path, &collection).await?
            } else {
                conversations.index_conversations(&path, &collection).await?
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::CheckViolation { action, context } => {
            let (violation, cached) = ctx.retrieval()?.check_violation(&action, &context).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "violation": violation,
                    "cached": cached,
                }))?
            );
        }
        Command::Run => {
            let cancel = CancellationToken::new();
            let scheduler = ctx.spawn_refresh_scheduler(cancel.clone())?;
            let result = crate::http::serve(Arc::clone(&ctx)).await;
            cancel.cancel();
            let _ = scheduler.await;
            ctx.shutdown();
            result?;
        }
        Command::Mcp => {
            crate::mcp::McpServer::new(Arc::clone(&ctx)).run().await?;
            ctx.shutdown();
        }
        Command::Health => {
            println!("{}", serde_json::to_string_pretty(&ctx.health().await)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::Cli;

    #[test]
    fn command_tree_is_well_formed() {
        Cli::command().debug_assert();
    }
}

//! rmcp stdio transport.
//!
//! Exposes the core operations as named MCP tools; every tool body is a
//! one-line delegate into the shared context.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::ErrorData as McpError;
use rmcp::ServerHandler;
use schemars::JsonSchema;
use sci_domain::ports::services::{
    AnalysisComponent, ComponentRequest, RetrievalServiceInterface,
};
use sci_infrastructure::AppContext;
use serde::Deserialize;
use serde_json::json;

/// MCP server over the shared context.
#[derive(Clone)]
pub struct McpServer {
    ctx: Arc<AppContext>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetPatternArgs {
    /// What to look up
    query: String,
    /// Documentation framework to search
    framework: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CheckComponentExistsArgs {
    /// Component, class, or function name
    component: String,
    /// Project to check
    project: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct IndexFrameworkDocsArgs {
    /// Framework name
    framework: String,
    /// Optional documentation URL override
    url: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ListIndexedFrameworksArgs {}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchCodeArgs {
    /// Natural-language query
    query: String,
    /// Project to search
    project: String,
    /// Maximum results to retrieve
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    5
}

#[derive(Debug, Deserialize, JsonSchema)]
struct IndexProjectArgs {
    /// Directory to index
    path: String,
    /// Project name
    name: String,
    /// vector, graph, hybrid, or auto
    mode: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct FindViolationsArgs {
    /// Project to scan
    project: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SuggestLibrariesArgs {
    /// Task to find libraries for
    task: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct IndexDocsUrlArgs {
    /// URL to fetch
    url: String,
    /// Target collection name
    collection: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct QueryDocsArgs {
    /// What to look up
    query: String,
    /// Documentation framework to search
    library: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct IndexGithubDocsArgs {
    /// Repository slug, `owner/repo`
    repo: String,
    /// Framework name to index under
    framework: String,
}

/// Tool name/description rows, one per exposed operation.
const TOOLS: &[(&str, &str)] = &[
    ("get_pattern", "Look up an implementation pattern in indexed framework documentation"),
    ("check_component_exists", "Check whether a component exists in an indexed project"),
    ("index_framework_docs", "Index a framework's documentation corpus"),
    ("list_indexed_frameworks", "List all indexed documentation frameworks"),
    ("search_code", "Search an indexed project with a natural-language query"),
    ("index_project", "Index a directory tree as a project collection"),
    ("find_violations", "Scan an indexed project for SOLID violations"),
    ("suggest_libraries", "Suggest libraries for a task"),
    ("index_docs_url", "Index documentation from a single URL"),
    ("query_docs", "Search a documentation framework"),
    ("index_github_docs", "Index a GitHub repository's documentation subtree"),
];

impl McpServer {
    /// Wrap the shared context.
    #[must_use]
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    /// Serve over stdio until the client disconnects.
    pub async fn run(self) -> anyhow::Result<()> {
        use rmcp::ServiceExt;
        let service = self.serve(rmcp::transport::stdio()).await?;
        service.waiting().await?;
        Ok(())
    }

    fn parse_args<T: serde::de::DeserializeOwned>(
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<T, McpError> {
        serde_json::from_value(serde_json::Value::Object(arguments.unwrap_or_default()))
            .map_err(|e| McpError::invalid_params(format!("Invalid arguments: {e}"), None))
    }

    fn text_result(text: impl Into<String>) -> CallToolResult {
        CallToolResult::success(vec![Content::text(text.into())])
    }

    fn json_result(value: &serde_json::Value) -> CallToolResult {
        Self::text_result(value.to_string())
    }

    fn internal(e: impl std::fmt::Display) -> McpError {
        McpError::internal_error(e.to_string(), None)
    }

    async fn dispatch(&self, name: &str, args: Option<serde_json::Map<String, serde_json::Value>>)
        -> Result<CallToolResult, McpError> {
        match name {
            "get_pattern" => {
                let args: GetPatternArgs = Self::parse_args(args)?;
                let pattern = self
                    .ctx
                    .docs()
                    .map_err(Self::internal)?
                    .search_pattern(&args.query, &args.framework)
                    .await
                    .map_err(Self::internal)?;
                Ok(Self::text_result(pattern))
            }
            "check_component_exists" => {
                let args: CheckComponentExistsArgs = Self::parse_args(args)?;
                let collection = self
                    .ctx
                    .project_collection(&args.project)
                    .map_err(Self::internal)?;
                let report = self
                    .ctx
                    .retrieval()
                    .map_err(Self::internal)?
                    .exists(&args.component, &collection)
                    .await
                    .map_err(Self::internal)?;
                Ok(Self::json_result(&json!({
                    "exists": report.exists,
                    "confidence": report.confidence,
                    "context": report.context,
                    "file": report.file,
                })))
            }
            "index_framework_docs" => {
                let args: IndexFrameworkDocsArgs = Self::parse_args(args)?;
                let outcome = self
                    .ctx
                    .docs()
                    .map_err(Self::internal)?
                    .index_framework(&args.framework, args.url.as_deref())
                    .await
                    .map_err(Self::internal)?;
                Ok(Self::json_result(&json!({
                    "indexed": outcome.indexed,
                    "collection": outcome.collection,
                })))
            }
            "list_indexed_frameworks" => {
                let frameworks = self
                    .ctx
                    .docs()
                    .map_err(Self::internal)?
                    .list_frameworks()
                    .await
                    .map_err(Self::internal)?;
                Ok(Self::json_result(&json!({ "frameworks": frameworks })))
            }
            "search_code" => {
                let args: SearchCodeArgs = Self::parse_args(args)?;
                let collection = self
                    .ctx
                    .project_collection(&args.project)
                    .map_err(Self::internal)?;
                let result = self
                    .ctx
                    .retrieval()
                    .map_err(Self::internal)?
                    .search(&args.query, &collection, args.limit)
                    .await
                    .map_err(Self::internal)?;
                Ok(Self::text_result(result))
            }
            "index_project" => {
                let args: IndexProjectArgs = Self::parse_args(args)?;
                let collection = self
                    .ctx
                    .project_collection(&args.name)
                    .map_err(Self::internal)?;
                let mode = args
                    .mode
                    .as_deref()
                    .map(str::parse)
                    .transpose()
                    .map_err(|e| McpError::invalid_params(format!("{e}"), None))?;
                let outcome = self
                    .ctx
                    .indexing()
                    .map_err(Self::internal)?
                    .index_project(&args.path, &collection, mode)
                    .await
                    .map_err(Self::internal)?;
                Ok(Self::json_result(&json!({
                    "indexed": outcome.indexed,
                    "nodes": outcome.nodes,
                    "mode": outcome.mode.to_string(),
                    "collection": outcome.collection,
                })))
            }
            "find_violations" => {
                let args: FindViolationsArgs = Self::parse_args(args)?;
                let collection = self
                    .ctx
                    .project_collection(&args.project)
                    .map_err(Self::internal)?;
                let findings = self
                    .ctx
                    .retrieval()
                    .map_err(Self::internal)?
                    .find_violations(&collection)
                    .await
                    .map_err(Self::internal)?;
                Ok(Self::json_result(&json!({ "violations": findings })))
            }
            "suggest_libraries" => {
                let args: SuggestLibrariesArgs = Self::parse_args(args)?;
                let component = self
                    .ctx
                    .component("analysis", "suggestions")
                    .map_err(Self::internal)?;
                let output = component
                    .run(&ComponentRequest::for_target(&args.task))
                    .await
                    .map_err(Self::internal)?;
                Ok(Self::text_result(output.into_items().join("\n")))
            }
            "index_docs_url" => {
                let args: IndexDocsUrlArgs = Self::parse_args(args)?;
                let collection = sci_domain::CollectionId::from(args.collection.as_str());
                let outcome = self
                    .ctx
                    .docs()
                    .map_err(Self::internal)?
                    .index_url(&args.url, &collection)
                    .await
                    .map_err(Self::internal)?;
                Ok(Self::json_result(&json!({
                    "indexed": outcome.indexed,
                    "collection": outcome.collection,
                })))
            }
            "query_docs" => {
                let args: QueryDocsArgs = Self::parse_args(args)?;
                let result = self
                    .ctx
                    .docs()
                    .map_err(Self::internal)?
                    .search_pattern(&args.query, &args.library)
                    .await
                    .map_err(Self::internal)?;
                Ok(Self::text_result(result))
            }
            "index_github_docs" => {
                let args: IndexGithubDocsArgs = Self::parse_args(args)?;
                let outcome = self
                    .ctx
                    .docs()
                    .map_err(Self::internal)?
                    .index_github(&args.repo, &args.framework)
                    .await
                    .map_err(Self::internal)?;
                Ok(Self::json_result(&json!({
                    "indexed": outcome.indexed,
                    "collection": outcome.collection,
                })))
            }
            other => Err(McpError::invalid_params(
                format!("Unknown tool: {other}"),
                None,
            )),
        }
    }

    fn schema_for_tool(name: &str) -> Result<serde_json::Map<String, serde_json::Value>, McpError> {
        let schema = match name {
            "get_pattern" => schemars::schema_for!(GetPatternArgs),
            "check_component_exists" => schemars::schema_for!(CheckComponentExistsArgs),
            "index_framework_docs" => schemars::schema_for!(IndexFrameworkDocsArgs),
            "list_indexed_frameworks" => schemars::schema_for!(ListIndexedFrameworksArgs),
            "search_code" => schemars::schema_for!(SearchCodeArgs),
            "index_project" => schemars::schema_for!(IndexProjectArgs),
            "find_violations" => schemars::schema_for!(FindViolationsArgs),
            "suggest_libraries" => schemars::schema_for!(SuggestLibrariesArgs),
            "index_docs_url" => schemars::schema_for!(IndexDocsUrlArgs),
            "query_docs" => schemars::schema_for!(QueryDocsArgs),
            "index_github_docs" => schemars::schema_for!(IndexGithubDocsArgs),
            other => {
                return Err(McpError::internal_error(
                    format!("No schema for tool {other}"),
                    None,
                ))
            }
        };
        serde_json::to_value(schema)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?
            .as_object()
            .cloned()
            .ok_or_else(|| McpError::internal_error("Schema is not an object", None))
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "sci".to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                ..Default::default()
            },
            instructions: Some(
                "Semantic code intelligence: index projects and documentation, then query \
                 them with natural language. Start with index_project or index_framework_docs; \
                 search with search_code, get_pattern, or query_docs."
                    .to_owned(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _pagination: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let mut tools = Vec::with_capacity(TOOLS.len());
        for (name, description) in TOOLS {
            tools.push(Tool {
                name: Cow::Borrowed(*name),
                title: None,
                description: Some(Cow::Borrowed(*description)),
                input_schema: Arc::new(Self::schema_for_tool(name)?),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: Default::default(),
            });
        }
        Ok(ListToolsResult {
            tools,
            meta: Default::default(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(request.name.as_ref(), request.arguments).await
    }
}

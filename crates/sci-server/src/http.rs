//! Axum HTTP transport.
//!
//! Each route delegates to a core operation and translates the typed error
//! kinds to HTTP statuses: client input errors map to 4xx, backend failures
//! to 5xx, all with an `{"error": ...}` body.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use sci_domain::error::Error;
use sci_domain::ports::providers::GraphStore;
use sci_domain::ports::services::{AnalysisComponent, ComponentRequest, RetrievalServiceInterface};
use sci_domain::value_objects::CollectionId;
use sci_infrastructure::AppContext;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auto_docs;

type HttpResult = Result<Json<Value>, ApiError>;

/// Error wrapper translating domain errors onto HTTP statuses.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::InvalidArgument { .. }
            | Error::Read { .. }
            | Error::Config { .. }
            | Error::ConfigMissing(_)
            | Error::ConfigInvalid { .. } => StatusCode::BAD_REQUEST,
            Error::Shutdown { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Deserialize)]
struct SearchBody {
    query: String,
    project: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    5
}

#[derive(Deserialize)]
struct IndexBody {
    path: String,
    name: String,
    mode: Option<String>,
}

#[derive(Deserialize)]
struct RefreshBody {
    path: String,
    name: String,
}

#[derive(Deserialize)]
struct OverviewBody {
    project_path: String,
    #[serde(default)]
    include: Vec<String>,
}

#[derive(Deserialize)]
struct ComplexBody {
    query: String,
    project: String,
}

#[derive(Deserialize)]
struct DocsIndexBody {
    library_name: String,
    docs_path: String,
}

#[derive(Deserialize)]
struct DocsSearchBody {
    query: String,
    library: String,
    #[serde(default)]
    examples_only: bool,
}

#[derive(Deserialize)]
struct AutoDocsBody {
    project_path: String,
}

#[derive(Deserialize)]
struct LanguageQuery {
    language: Option<String>,
}

#[derive(Deserialize)]
struct ViolationQuery {
    action: String,
    #[serde(default)]
    context: String,
}

#[derive(Deserialize)]
struct SmartQueryParams {
    query: String,
}

#[derive(Deserialize)]
struct ExistsParams {
    component: String,
    project: String,
}

#[derive(Deserialize)]
struct PatternParams {
    query: String,
    framework: String,
}

#[derive(Deserialize)]
struct IndexFrameworkParams {
    framework: String,
    url: Option<String>,
}

/// Build the HTTP router over a shared context.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/search", post(search))
        .route("/index", post(index_project))
        .route("/refresh/project", post(refresh_project))
        .route("/violations/{project}", get(violations))
        .route("/analyze/architecture/{project}", get(architecture))
        .route("/analyze/overview", post(overview))
        .route("/check/violation", get(check_violation))
        .route("/smart/query", get(smart_query))
        .route("/exists", get(exists))
        .route("/complex", post(complex))
        .route("/docs/index", post(docs_index))
        .route("/docs/search", post(docs_search))
        .route("/docs/libraries", get(docs_libraries))
        .route("/docs/library/{library}", get(docs_library))
        .route("/docs/pattern", get(docs_pattern))
        .route("/docs/index-framework", post(docs_index_framework))
        .route("/docs/frameworks", get(docs_frameworks))
        .route("/graph/{project}", get(graph))
        .route("/graph/{project}/export", get(graph_export))
        .route("/graph/{project}/visualize", get(graph_visualize))
        .route("/api/auto-docs/setup", post(auto_docs_setup))
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(ctx)
}

/// Serve the router until the process is stopped.
pub async fn serve(ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let config = ctx.config()?;
    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!(addr = %addr, "HTTP transport listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "semantic code intelligence",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    Json(ctx.health().await)
}

async fn search(State(ctx): State<Arc<AppContext>>, Json(body): Json<SearchBody>) -> HttpResult {
    let collection = ctx.project_collection(&body.project)?;
    let result = ctx
        .retrieval()?
        .search(&body.query, &collection, body.limit)
        .await?;
    Ok(Json(json!({ "result": result })))
}

async fn index_project(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<IndexBody>,
) -> HttpResult {
    let collection = ctx.project_collection(&body.name)?;
    let mode = body.mode.as_deref().map(str::parse).transpose()?;
    let outcome = ctx
        .indexing()?
        .index_project(&body.path, &collection, mode)
        .await?;
    Ok(Json(json!({
        "indexed": outcome.indexed,
        "mode": outcome.mode.to_string(),
        "collection": outcome.collection,
    })))
}

async fn refresh_project(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<RefreshBody>,
) -> HttpResult {
    let collection = ctx.project_collection(&body.name)?;
    let outcome = ctx
        .indexing()?
        .refresh_project(&body.path, &collection)
        .await?;
    Ok(Json(json!({
        "refreshed": outcome.refreshed,
        "total": outcome.total,
        "unchanged": outcome.unchanged,
        "collection": outcome.collection,
    })))
}

async fn violations(
    State(ctx): State<Arc<AppContext>>,
    Path(project): Path<String>,
) -> HttpResult {
    let collection = ctx.project_collection(&project)?;
    let component = ctx.component("analysis", "violations")?;
    let output = component
        .run(&ComponentRequest::for_target(collection.as_str()))
        .await?;
    Ok(Json(json!({ "violations": output.into_items() })))
}

async fn architecture(
    State(ctx): State<Arc<AppContext>>,
    Path(project): Path<String>,
    Query(params): Query<LanguageQuery>,
) -> HttpResult {
    let collection = ctx.project_collection(&project)?;
    let mut request = ComponentRequest::for_target(collection.as_str());
    if let Some(language) = &params.language {
        request = request.with_language(language);
    }
    let output = ctx.component("analysis", "architecture")?.run(&request).await?;
    let issues = output.into_items();
    let compliant = issues.iter().all(|i| i.starts_with('\u{2705}'));
    Ok(Json(json!({
        "project": project,
        "language": params.language,
        "architecture_issues": issues,
        "compliant": compliant,
    })))
}

async fn overview(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<OverviewBody>,
) -> HttpResult {
    let collection = CollectionId::from(body.project_path.as_str());
    let retrieval = ctx.retrieval()?;
    let wants = |section: &str| body.include.is_empty() || body.include.iter().any(|i| i == section);

    let structure = if wants("structure") {
        retrieval
            .search("Describe the overall structure and organization of this codebase", &collection, 5)
            .await?
    } else {
        String::new()
    };
    let patterns = if wants("patterns") {
        retrieval.check_architecture(&collection, None).await?
    } else {
        Vec::new()
    };
    let violations = if wants("violations") {
        retrieval.find_violations(&collection).await?
    } else {
        Vec::new()
    };
    let important_files = if wants("important_files") {
        retrieval
            .search("List the most important files and what each is responsible for", &collection, 5)
            .await?
    } else {
        String::new()
    };

    Ok(Json(json!({
        "structure": structure,
        "patterns": patterns,
        "violations": violations,
        "important_files": important_files,
    })))
}

async fn check_violation(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<ViolationQuery>,
) -> HttpResult {
    let (violation, cached) = ctx
        .retrieval()?
        .check_violation(&params.action, &params.context)
        .await?;
    Ok(Json(json!({
        "violation": violation,
        "cached": cached,
        "action": params.action,
        "context": params.context,
    })))
}

async fn smart_query(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<SmartQueryParams>,
) -> HttpResult {
    let result = ctx.retrieval()?.smart_query(&params.query, None).await?;
    Ok(Json(json!({ "query": params.query, "result": result })))
}

async fn exists(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<ExistsParams>,
) -> HttpResult {
    let collection = ctx.project_collection(&params.project)?;
    let request = ComponentRequest::for_target(collection.as_str()).with_query(&params.component);
    let output = ctx.component("analysis", "existence")?.run(&request).await?;
    match output {
        sci_domain::ports::services::ComponentOutput::Json(value) => Ok(Json(value)),
        other => Ok(Json(json!({ "result": other.into_items() }))),
    }
}

async fn complex(State(ctx): State<Arc<AppContext>>, Json(body): Json<ComplexBody>) -> HttpResult {
    let collection = ctx.project_collection(&body.project)?;
    let response = ctx
        .retrieval()?
        .answer_complex(&body.query, &[collection])
        .await?;
    Ok(Json(json!({
        "query": body.query,
        "project": body.project,
        "response": response,
    })))
}

async fn docs_index(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<DocsIndexBody>,
) -> HttpResult {
    let outcome = ctx
        .docs()?
        .index_framework(&body.library_name, Some(&body.docs_path))
        .await?;
    Ok(Json(json!({
        "indexed": outcome.indexed,
        "collection": outcome.collection,
    })))
}

async fn docs_search(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<DocsSearchBody>,
) -> HttpResult {
    let query = if body.examples_only {
        format!("{} (show code examples only)", body.query)
    } else {
        body.query.clone()
    };
    let result = ctx.docs()?.search_pattern(&query, &body.library).await?;
    Ok(Json(json!({ "library": body.library, "result": result })))
}

async fn docs_libraries(State(ctx): State<Arc<AppContext>>) -> HttpResult {
    let libraries = ctx.docs()?.list_frameworks().await?;
    Ok(Json(json!({ "libraries": libraries })))
}

async fn docs_library(
    State(ctx): State<Arc<AppContext>>,
    Path(library): Path<String>,
) -> HttpResult {
    Ok(Json(ctx.docs()?.framework_info(&library).await?))
}

async fn docs_pattern(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<PatternParams>,
) -> HttpResult {
    let result = ctx
        .docs()?
        .search_pattern(&params.query, &params.framework)
        .await?;
    Ok(Json(json!({
        "framework": params.framework,
        "pattern": result,
    })))
}

async fn docs_index_framework(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<IndexFrameworkParams>,
) -> HttpResult {
    let outcome = ctx
        .docs()?
        .index_framework(&params.framework, params.url.as_deref())
        .await?;
    Ok(Json(json!({
        "indexed": outcome.indexed,
        "collection": outcome.collection,
    })))
}

async fn docs_frameworks(State(ctx): State<Arc<AppContext>>) -> HttpResult {
    let frameworks = ctx.docs()?.list_frameworks().await?;
    Ok(Json(json!({ "frameworks": frameworks })))
}

async fn graph(State(ctx): State<Arc<AppContext>>, Path(project): Path<String>) -> HttpResult {
    let collection = ctx.project_collection(&project)?;
    let triplets = ctx.graph_store()?.triplets(&collection, None).await?;
    Ok(Json(json!({ "project": project, "triplets": triplets })))
}

async fn graph_export(
    State(ctx): State<Arc<AppContext>>,
    Path(project): Path<String>,
) -> HttpResult {
    let collection = ctx.project_collection(&project)?;
    let export = ctx.graph_store()?.export(&collection).await?;
    let value = serde_json::to_value(export).map_err(Error::from)?;
    Ok(Json(value))
}

async fn graph_visualize(
    State(ctx): State<Arc<AppContext>>,
    Path(project): Path<String>,
) -> HttpResult {
    let collection = ctx.project_collection(&project)?;
    let mermaid = ctx.graph_store()?.visualize(&collection).await?;
    Ok(Json(json!({ "project": project, "diagram": mermaid, "format": "mermaid" })))
}

async fn auto_docs_setup(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<AutoDocsBody>,
) -> HttpResult {
    let config = ctx.config()?;
    let service_url = format!("http://localhost:{}", config.api_port);
    let report = auto_docs::setup_project_hooks(&body.project_path, &service_url)?;
    Ok(Json(report))
}

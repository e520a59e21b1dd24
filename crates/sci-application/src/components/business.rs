//! Business domain components.

use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::error::Result;
use sci_domain::ports::services::{
    AnalysisComponent, ComponentDeps, ComponentOutput, ComponentRequest, PromptLibrary,
    RetrievalServiceInterface,
};
use sci_domain::registry::component::{ComponentEntry, ANALYSIS_COMPONENTS};
use sci_domain::value_objects::CollectionId;
use serde_json::json;

/// Extracts business rules, entities, processes, and constraints from an
/// indexed codebase in analyst-readable language.
pub struct BusinessExtractionComponent {
    retrieval: Arc<dyn RetrievalServiceInterface>,
    prompts: Arc<dyn PromptLibrary>,
}

#[async_trait]
impl AnalysisComponent for BusinessExtractionComponent {
    fn component_name(&self) -> &str {
        "extraction"
    }

    async fn run(&self, request: &ComponentRequest) -> Result<ComponentOutput> {
        let collection = CollectionId::from(request.target.as_str());
        if !self.retrieval.collection_exists(&collection).await? {
            return Ok(ComponentOutput::Json(json!({
                "error": format!("Project '{}' not indexed", request.target),
            })));
        }

        let query = self
            .prompts
            .get("business", "extract")
            .ok_or_else(|| sci_domain::error::Error::config("Missing prompt business/extract"))?;

        let business_logic = self.retrieval.search(&query, &collection, 5).await?;
        Ok(ComponentOutput::Json(json!({
            "project": request.target,
            "business_logic": business_logic,
            "extraction_type": "comprehensive",
        })))
    }
}

fn build_extraction(
    deps: &ComponentDeps,
) -> std::result::Result<Arc<dyn AnalysisComponent>, String> {
    Ok(Arc::new(BusinessExtractionComponent {
        retrieval: Arc::clone(&deps.retrieval),
        prompts: Arc::clone(&deps.prompts),
    }))
}

#[linkme::distributed_slice(ANALYSIS_COMPONENTS)]
static EXTRACTION_COMPONENT: ComponentEntry = ComponentEntry {
    domain: "business",
    name: "extraction",
    description: "Business-logic extraction in analyst-readable language",
    build: build_extraction,
};

//! Visualization domain components.
//!
//! Diagram generators are single-query wrappers: each issues one retrieval
//! query whose prompt instructs the synthesizer to answer in the target
//! diagram syntax.

use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::error::Result;
use sci_domain::ports::services::{
    AnalysisComponent, ComponentDeps, ComponentOutput, ComponentRequest, PromptLibrary,
    RetrievalServiceInterface,
};
use sci_domain::registry::component::{ComponentEntry, ANALYSIS_COMPONENTS};
use sci_domain::value_objects::CollectionId;

/// Shared implementation for all diagram components: one prompt-driven
/// retrieval query against the target collection.
struct DiagramComponent {
    name: &'static str,
    prompt_name: &'static str,
    retrieval: Arc<dyn RetrievalServiceInterface>,
    prompts: Arc<dyn PromptLibrary>,
}

#[async_trait]
impl AnalysisComponent for DiagramComponent {
    fn component_name(&self) -> &str {
        self.name
    }

    async fn run(&self, request: &ComponentRequest) -> Result<ComponentOutput> {
        let collection = CollectionId::from(request.target.as_str());
        let query = self
            .prompts
            .get("visualization", self.prompt_name)
            .ok_or_else(|| {
                sci_domain::error::Error::config(format!(
                    "Missing prompt visualization/{}",
                    self.prompt_name
                ))
            })?;

        let diagram = self.retrieval.search(&query, &collection, 5).await?;
        Ok(ComponentOutput::Text(diagram))
    }
}

fn build_diagram(
    deps: &ComponentDeps,
    name: &'static str,
    prompt_name: &'static str,
) -> std::result::Result<Arc<dyn AnalysisComponent>, String> {
    Ok(Arc::new(DiagramComponent {
        name,
        prompt_name,
        retrieval: Arc::clone(&deps.retrieval),
        prompts: Arc::clone(&deps.prompts),
    }))
}

fn build_mermaid(deps: &ComponentDeps) -> std::result::Result<Arc<dyn AnalysisComponent>, String> {
    build_diagram(deps, "mermaid", "mermaid")
}

fn build_plantuml(
    deps: &ComponentDeps,
) -> std::result::Result<Arc<dyn AnalysisComponent>, String> {
    build_diagram(deps, "plantuml", "plantuml")
}

fn build_sequence(
    deps: &ComponentDeps,
) -> std::result::Result<Arc<dyn AnalysisComponent>, String> {
    build_diagram(deps, "sequence", "sequence")
}

fn build_structural(
    deps: &ComponentDeps,
) -> std::result::Result<Arc<dyn AnalysisComponent>, String> {
    build_diagram(deps, "structural", "structural")
}

#[linkme::distributed_slice(ANALYSIS_COMPONENTS)]
static MERMAID_COMPONENT: ComponentEntry = ComponentEntry {
    domain: "visualization",
    name: "mermaid",
    description: "Mermaid.js sequence diagram of the main execution flow",
    build: build_mermaid,
};

#[linkme::distributed_slice(ANALYSIS_COMPONENTS)]
static PLANTUML_COMPONENT: ComponentEntry = ComponentEntry {
    domain: "visualization",
    name: "plantuml",
    description: "PlantUML class diagram of the core types",
    build: build_plantuml,
};

#[linkme::distributed_slice(ANALYSIS_COMPONENTS)]
static SEQUENCE_COMPONENT: ComponentEntry = ComponentEntry {
    domain: "visualization",
    name: "sequence",
    description: "Textual sequence description of the main workflow",
    build: build_sequence,
};

#[linkme::distributed_slice(ANALYSIS_COMPONENTS)]
static STRUCTURAL_COMPONENT: ComponentEntry = ComponentEntry {
    domain: "visualization",
    name: "structural",
    description: "Architecture overview of modules and their dependencies",
    build: build_structural,
};

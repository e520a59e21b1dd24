//! Analysis domain components.

use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::error::Result;
use sci_domain::ports::providers::{LlmKind, LlmProvider};
use sci_domain::ports::services::{
    AnalysisComponent, ComponentDeps, ComponentOutput, ComponentRequest, PromptLibrary,
    RetrievalServiceInterface,
};
use sci_domain::registry::component::{ComponentEntry, ANALYSIS_COMPONENTS};
use sci_domain::value_objects::CollectionId;
use serde_json::json;

/// SOLID violation scan over an indexed project.
pub struct ViolationsComponent {
    retrieval: Arc<dyn RetrievalServiceInterface>,
}

#[async_trait]
impl AnalysisComponent for ViolationsComponent {
    fn component_name(&self) -> &str {
        "violations"
    }

    async fn run(&self, request: &ComponentRequest) -> Result<ComponentOutput> {
        let collection = CollectionId::from(request.target.as_str());
        let findings = self.retrieval.find_violations(&collection).await?;
        Ok(ComponentOutput::Items(findings))
    }
}

/// Architecture-pattern compliance scan.
pub struct ArchitectureComponent {
    retrieval: Arc<dyn RetrievalServiceInterface>,
}

#[async_trait]
impl AnalysisComponent for ArchitectureComponent {
    fn component_name(&self) -> &str {
        "architecture"
    }

    async fn run(&self, request: &ComponentRequest) -> Result<ComponentOutput> {
        let collection = CollectionId::from(request.target.as_str());
        let findings = self
            .retrieval
            .check_architecture(&collection, request.language.as_deref())
            .await?;
        Ok(ComponentOutput::Items(findings))
    }
}

/// Component existence check.
pub struct ExistenceComponent {
    retrieval: Arc<dyn RetrievalServiceInterface>,
}

#[async_trait]
impl AnalysisComponent for ExistenceComponent {
    fn component_name(&self) -> &str {
        "existence"
    }

    async fn run(&self, request: &ComponentRequest) -> Result<ComponentOutput> {
        let collection = CollectionId::from(request.target.as_str());
        let component = request.query.as_deref().unwrap_or_default();
        let report = self.retrieval.exists(component, &collection).await?;
        Ok(ComponentOutput::Json(json!({
            "exists": report.exists,
            "confidence": report.confidence,
            "context": report.context,
            "file": report.file,
            "project": request.target,
        })))
    }
}

/// Library suggestions: LLM-only, no retrieval.
pub struct SuggestionsComponent {
    llm: Arc<dyn LlmProvider>,
    prompts: Arc<dyn PromptLibrary>,
}

#[async_trait]
impl AnalysisComponent for SuggestionsComponent {
    fn component_name(&self) -> &str {
        "suggestions"
    }

    async fn run(&self, request: &ComponentRequest) -> Result<ComponentOutput> {
        let task = request.query.as_deref().unwrap_or(request.target.as_str());

        let prompt = match &request.language {
            Some(project_type) => self.prompts.render(
                "library_suggestions",
                "with_context",
                &[("task", task), ("project_type", project_type)],
            ),
            None => self
                .prompts
                .render("library_suggestions", "default", &[("task", task)]),
        }
        .ok_or_else(|| {
            sci_domain::error::Error::config("Missing prompt library_suggestions/default")
        })?;

        let suggestions = self.llm.complete(&prompt, LlmKind::Fast).await?;
        Ok(ComponentOutput::Text(suggestions))
    }
}

fn build_violations(
    deps: &ComponentDeps,
) -> std::result::Result<Arc<dyn AnalysisComponent>, String> {
    Ok(Arc::new(ViolationsComponent {
        retrieval: Arc::clone(&deps.retrieval),
    }))
}

fn build_architecture(
    deps: &ComponentDeps,
) -> std::result::Result<Arc<dyn AnalysisComponent>, String> {
    Ok(Arc::new(ArchitectureComponent {
        retrieval: Arc::clone(&deps.retrieval),
    }))
}

fn build_existence(
    deps: &ComponentDeps,
) -> std::result::Result<Arc<dyn AnalysisComponent>, String> {
    Ok(Arc::new(ExistenceComponent {
        retrieval: Arc::clone(&deps.retrieval),
    }))
}

fn build_suggestions(
    deps: &ComponentDeps,
) -> std::result::Result<Arc<dyn AnalysisComponent>, String> {
    Ok(Arc::new(SuggestionsComponent {
        llm: Arc::clone(&deps.llm),
        prompts: Arc::clone(&deps.prompts),
    }))
}

#[linkme::distributed_slice(ANALYSIS_COMPONENTS)]
static VIOLATIONS_COMPONENT: ComponentEntry = ComponentEntry {
    domain: "analysis",
    name: "violations",
    description: "SOLID violation scan over an indexed project",
    build: build_violations,
};

#[linkme::distributed_slice(ANALYSIS_COMPONENTS)]
static ARCHITECTURE_COMPONENT: ComponentEntry = ComponentEntry {
    domain: "analysis",
    name: "architecture",
    description: "Architecture-pattern compliance scan",
    build: build_architecture,
};

#[linkme::distributed_slice(ANALYSIS_COMPONENTS)]
static EXISTENCE_COMPONENT: ComponentEntry = ComponentEntry {
    domain: "analysis",
    name: "existence",
    description: "Semantic component existence check",
    build: build_existence,
};

#[linkme::distributed_slice(ANALYSIS_COMPONENTS)]
static SUGGESTIONS_COMPONENT: ComponentEntry = ComponentEntry {
    domain: "analysis",
    name: "suggestions",
    description: "Library suggestions for a task (LLM-only)",
    build: build_suggestions,
};

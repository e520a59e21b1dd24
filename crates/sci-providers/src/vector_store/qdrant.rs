//! Qdrant vector store provider.
//!
//! Talks to Qdrant over its REST API: collection management, point upsert,
//! similarity search, counting, and payload scrolling. Collection payloads
//! carry the node id, document id, file path, content, and content hash.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::VectorStoreProvider;
use sci_domain::registry::vector_store::{
    VectorStoreProviderConfig, VectorStoreProviderEntry, VECTOR_STORE_PROVIDERS,
};
use sci_domain::value_objects::{CollectionId, SearchResult, VectorPoint};
use serde::Deserialize;
use serde_json::{json, Value};

use sci_application::index_store::payload_keys;

const DEFAULT_URL: &str = "http://localhost:6333";

#[derive(Debug, Deserialize)]
struct QdrantResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct CollectionsList {
    collections: Vec<CollectionDescription>,
}

#[derive(Debug, Deserialize)]
struct CollectionDescription {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct ScrollResult {
    points: Vec<ScrollPoint>,
}

#[derive(Debug, Deserialize)]
struct ScrollPoint {
    #[serde(default)]
    payload: HashMap<String, Value>,
}

/// Qdrant REST client.
pub struct QdrantVectorStoreProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl QdrantVectorStoreProvider {
    /// Create a client against the given Qdrant URL.
    #[must_use]
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key);
        }
        builder
    }

    async fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Error::vector_store(format!(
                "{context} returned {}",
                response.status()
            )))
        }
    }

    fn payload_result(payload: &HashMap<String, Value>, score: f32) -> SearchResult {
        let str_field = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        SearchResult {
            node_id: str_field(payload_keys::NODE_ID),
            file_path: str_field(payload_keys::FILE_PATH),
            content: str_field(payload_keys::CONTENT),
            score,
        }
    }
}

#[async_trait]
impl VectorStoreProvider for QdrantVectorStoreProvider {
    async fn collection_exists(&self, collection: &CollectionId) -> Result<bool> {
        let response = self
            .request(reqwest::Method::GET, &format!("/collections/{collection}"))
            .send()
            .await
            .map_err(|e| Error::network_with_source("Qdrant unreachable", e))?;
        Ok(response.status().is_success())
    }

    async fn create_collection(&self, collection: &CollectionId, dimensions: usize) -> Result<()> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/collections/{collection}"))
            .json(&json!({
                "vectors": { "size": dimensions, "distance": "Cosine" },
            }))
            .send()
            .await
            .map_err(|e| Error::network_with_source("Qdrant unreachable", e))?;
        Self::check(response, "Collection create").await?;
        Ok(())
    }

    async fn delete_collection(&self, collection: &CollectionId) -> Result<()> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/collections/{collection}"),
            )
            .send()
            .await
            .map_err(|e| Error::network_with_source("Qdrant unreachable", e))?;
        // Deleting an absent collection stays idempotent.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response, "Collection delete").await?;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let response = self
            .request(reqwest::Method::GET, "/collections")
            .send()
            .await
            .map_err(|e| Error::network_with_source("Qdrant unreachable", e))?;
        let response = Self::check(response, "Collections list").await?;
        let body: QdrantResponse<CollectionsList> = response
            .json()
            .await
            .map_err(|e| Error::network_with_source("Malformed Qdrant response", e))?;
        Ok(body
            .result
            .collections
            .into_iter()
            .map(|c| c.name)
            .collect())
    }

    async fn upsert_points(&self, collection: &CollectionId, points: &[VectorPoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let body: Vec<Value> = points
            .iter()
            .map(|p| {
                json!({
                    "id": p.id,
                    "vector": p.vector,
                    "payload": p.payload,
                })
            })
            .collect();

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{collection}/points?wait=true"),
            )
            .json(&json!({ "points": body }))
            .send()
            .await
            .map_err(|e| Error::network_with_source("Qdrant unreachable", e))?;
        Self::check(response, "Point upsert").await?;
        Ok(())
    }

    async fn search_points(
        &self,
        collection: &CollectionId,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{collection}/points/search"),
            )
            .json(&json!({
                "vector": query_vector,
                "limit": limit,
                "with_payload": true,
            }))
            .send()
            .await
            .map_err(|e| Error::network_with_source("Qdrant unreachable", e))?;
        let response = Self::check(response, "Point search").await?;
        let body: QdrantResponse<Vec<ScoredPoint>> = response
            .json()
            .await
            .map_err(|e| Error::network_with_source("Malformed Qdrant response", e))?;
        Ok(body
            .result
            .iter()
            .map(|p| Self::payload_result(&p.payload, p.score))
            .collect())
    }

    async fn point_count(&self, collection: &CollectionId) -> Result<u64> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{collection}/points/count"),
            )
            .json(&json!({ "exact": true }))
            .send()
            .await
            .map_err(|e| Error::network_with_source("Qdrant unreachable", e))?;
        let response = Self::check(response, "Point count").await?;
        let body: QdrantResponse<CountResult> = response
            .json()
            .await
            .map_err(|e| Error::network_with_source("Malformed Qdrant response", e))?;
        Ok(body.result.count)
    }

    async fn scroll_payloads(
        &self,
        collection: &CollectionId,
        limit: usize,
    ) -> Result<Vec<HashMap<String, Value>>> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{collection}/points/scroll"),
            )
            .json(&json!({
                "limit": limit,
                "with_payload": true,
                "with_vector": false,
            }))
            .send()
            .await
            .map_err(|e| Error::network_with_source("Qdrant unreachable", e))?;
        let response = Self::check(response, "Point scroll").await?;
        let body: QdrantResponse<ScrollResult> = response
            .json()
            .await
            .map_err(|e| Error::network_with_source("Malformed Qdrant response", e))?;
        Ok(body.result.points.into_iter().map(|p| p.payload).collect())
    }

    fn provider_name(&self) -> &str {
        "qdrant"
    }
}

fn qdrant_factory(
    config: &VectorStoreProviderConfig,
) -> std::result::Result<Arc<dyn VectorStoreProvider>, String> {
    let url = config.url.clone().unwrap_or_else(|| DEFAULT_URL.to_owned());
    Ok(Arc::new(QdrantVectorStoreProvider::new(
        url,
        config.api_key.clone(),
    )))
}

#[linkme::distributed_slice(VECTOR_STORE_PROVIDERS)]
static QDRANT_PROVIDER: VectorStoreProviderEntry = VectorStoreProviderEntry {
    name: "qdrant",
    description: "Qdrant vector database over REST",
    build: qdrant_factory,
};

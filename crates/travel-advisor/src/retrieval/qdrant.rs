//! Qdrant REST index
//!
//! Embeds the query with an [`EmbeddingProvider`] and runs a vector search
//! against an existing Qdrant collection.

use std::sync::Arc;
use std::time::Duration;

use agent_core::EmbeddingProvider;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use super::PassageIndex;
use crate::error::{Result, TravelError};
use crate::model::Passage;

/// Qdrant connection settings
#[derive(Clone, Debug)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
    pub api_key: Option<String>,
    /// Payload path holding the passage text
    pub content_key: String,
    /// Payload path holding the source document name
    pub source_key: String,
    pub timeout: Duration,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".into(),
            collection: "travel_docs".into(),
            api_key: None,
            content_key: "page_content".into(),
            source_key: "metadata.source".into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Passage index backed by a Qdrant collection
pub struct QdrantIndex {
    client: reqwest::Client,
    config: QdrantConfig,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl QdrantIndex {
    pub fn new(config: QdrantConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            embedder,
        })
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/collections/{}",
            self.config.url.trim_end_matches('/'),
            self.config.collection
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }
}

#[async_trait]
impl PassageIndex for QdrantIndex {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Passage>> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| TravelError::Embedding(e.to_string()))?;

        tracing::debug!(
            collection = %self.config.collection,
            model = self.embedder.embedding_model(),
            dims = vector.len(),
            limit,
            "Searching passages"
        );

        let url = format!("{}/points/search", self.collection_url());
        let body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });

        let response = self.request(self.client.post(url)).json(&body).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TravelError::IndexUnavailable(format!(
                "collection '{}' does not exist",
                self.config.collection
            )));
        }
        if !status.is_success() {
            return Err(TravelError::Upstream(format!("Qdrant returned status {}", status)));
        }

        let value: Value = response.json().await?;
        passages_from_response(value, &self.config.content_key, &self.config.source_key)
    }

    async fn is_ready(&self) -> Result<bool> {
        let response = self
            .request(self.client.get(self.collection_url()))
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(TravelError::IndexUnavailable(format!("Qdrant returned status {}", s))),
        }
    }

    fn name(&self) -> &str {
        &self.config.collection
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: Value,
}

/// Follow a dot-separated path into a JSON payload
fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(payload, |node, key| node.get(key))
}

fn passages_from_response(value: Value, content_key: &str, source_key: &str) -> Result<Vec<Passage>> {
    let response: SearchResponse = serde_json::from_value(value)?;

    Ok(response
        .result
        .into_iter()
        .filter_map(|point| {
            let text = lookup(&point.payload, content_key)?.as_str()?.trim();
            if text.is_empty() {
                return None;
            }
            Some(Passage {
                text: text.to_string(),
                source: lookup(&point.payload, source_key)
                    .and_then(Value::as_str)
                    .map(String::from),
                score: point.score,
            })
        })
        .collect())
}

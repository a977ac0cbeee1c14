//! Travel Knowledge Tool
//!
//! Retrieval over the indexed travel documents (visa rules, baggage
//! policies, destination guides).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{
    tool::{ParameterSchema, ValidationError},
    Result as CoreResult, Tool, ToolCall, ToolFailure, ToolResult, ToolSchema,
};

use crate::retrieval::PassageIndex;

const NAME: &str = "travel_knowledge";
const MAX_TOP_K: i64 = 10;
const MAX_PASSAGE_CHARS: usize = 1200;

pub struct KnowledgeBaseTool {
    index: Arc<dyn PassageIndex>,
    top_k: usize,
}

impl KnowledgeBaseTool {
    pub fn new(index: Arc<dyn PassageIndex>) -> Self {
        Self { index, top_k: 3 }
    }

    /// Passages returned when the model does not ask for a count
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.clamp(1, MAX_TOP_K as usize);
        self
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_PASSAGE_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_PASSAGE_CHARS).collect();
    format!("{}...", cut.trim_end())
}

#[async_trait]
impl Tool for KnowledgeBaseTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Look up travel information in the document collection: visa and entry \
                          rules, baggage allowances, airline policies, destination guides."
                .into(),
            parameters: vec![
                ParameterSchema::required("query", "string", "What to look up, in plain words"),
                ParameterSchema::optional("top_k", "integer", "Number of passages to return (1-10)")
                    .with_default(json!(self.top_k)),
            ],
        }
    }

    fn validate(&self, call: &ToolCall) -> Result<(), ValidationError> {
        self.schema().validate(&call.arguments)?;
        match call.arguments.get("top_k").and_then(|v| v.as_i64()) {
            Some(k) if !(1..=MAX_TOP_K).contains(&k) => Err(ValidationError::new(
                NAME,
                "top_k",
                format!("`top_k` must be between 1 and {}", MAX_TOP_K),
            )),
            _ => Ok(()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.str_arg("query").unwrap_or_default();
        let top_k = call
            .arguments
            .get("top_k")
            .and_then(|v| v.as_u64())
            .map_or(self.top_k, |k| k as usize);

        tracing::info!(index = self.index.name(), query, top_k, "Retrieving passages");

        let passages = match self.index.search(query, top_k).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(index = self.index.name(), error = %e, "Retrieval failed");
                return Ok(ToolResult::failure(NAME, ToolFailure::UpstreamError, e.to_string()));
            }
        };

        if passages.is_empty() {
            return Ok(ToolResult::success(
                NAME,
                format!("No matching passages found in the travel knowledge base for \"{}\".", query),
            ));
        }

        let output = passages
            .iter()
            .enumerate()
            .map(|(i, p)| {
                format!(
                    "[{}] (source: {}, score {:.2})\n{}",
                    i + 1,
                    p.source.as_deref().unwrap_or("unknown"),
                    p.score,
                    truncate(&p.text)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(ToolResult::success(NAME, output).with_data(json!({ "passages": passages.len() })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, TravelError};
    use crate::model::Passage;
    use crate::retrieval::MemoryIndex;

    struct DownIndex;

    #[async_trait]
    impl PassageIndex for DownIndex {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<Passage>> {
            Err(TravelError::IndexUnavailable("connection refused".into()))
        }

        async fn is_ready(&self) -> Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    fn tool() -> KnowledgeBaseTool {
        let index = MemoryIndex::new()
            .with_passage("Carry-on baggage on LOT is limited to 8 kg.", Some("lot-baggage.md"))
            .with_passage("Poland is part of the Schengen area.", Some("visas.md"));
        KnowledgeBaseTool::new(Arc::new(index))
    }

    #[tokio::test]
    async fn test_returns_numbered_passages() {
        let call = ToolCall::new(NAME).with_arg("query", "LOT baggage limit");
        let result = tool().execute(&call).await.unwrap();
        let observation = result.observation();
        assert!(observation.contains("[1] (source: lot-baggage.md"));
        assert!(observation.contains("8 kg"));
    }

    #[tokio::test]
    async fn test_no_match_is_explicit() {
        let call = ToolCall::new(NAME).with_arg("query", "ski resorts");
        let result = tool().execute(&call).await.unwrap();
        assert!(result.is_success());
        assert!(result.observation().contains("No matching passages found"));
    }

    #[tokio::test]
    async fn test_index_failure_is_upstream_error() {
        let tool = KnowledgeBaseTool::new(Arc::new(DownIndex));
        let result = tool.execute(&ToolCall::new(NAME).with_arg("query", "visa")).await.unwrap();
        assert_eq!(result.failure_kind(), Some(ToolFailure::UpstreamError));
    }

    #[test]
    fn test_top_k_bounds() {
        let call = ToolCall::new(NAME).with_arg("query", "visa").with_arg("top_k", 50);
        assert!(tool().validate(&call).is_err());
        assert!(tool().validate(&ToolCall::new(NAME)).is_err());
    }

    #[test]
    fn test_truncate_long_passage() {
        let long = "a".repeat(MAX_PASSAGE_CHARS + 10);
        assert!(truncate(&long).ends_with("..."));
        assert_eq!(truncate("short"), "short");
    }
}

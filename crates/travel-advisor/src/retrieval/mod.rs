//! Knowledge Retrieval
//!
//! Similarity search over pre-indexed travel documents. Population of the
//! index happens elsewhere; here it is only queried.

mod memory;
mod qdrant;

pub use memory::MemoryIndex;
pub use qdrant::{QdrantConfig, QdrantIndex};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Passage;

/// Passage index trait (Strategy pattern)
#[async_trait]
pub trait PassageIndex: Send + Sync {
    /// Closest passages to `query`, best first. May be empty.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Passage>>;

    /// Whether the backing collection exists and can be queried
    async fn is_ready(&self) -> Result<bool>;

    /// Index name for logs
    fn name(&self) -> &str;
}

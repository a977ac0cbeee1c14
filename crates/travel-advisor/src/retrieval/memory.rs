//! In-memory passage index
//!
//! Keyword-overlap scoring over a fixed passage list. Used for tests and
//! the offline demo mode.

use async_trait::async_trait;

use super::PassageIndex;
use crate::error::Result;
use crate::model::Passage;

pub struct MemoryIndex {
    passages: Vec<(String, Option<String>)>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self { passages: Vec::new() }
    }

    pub fn with_passage(mut self, text: impl Into<String>, source: Option<&str>) -> Self {
        self.passages.push((text.into(), source.map(String::from)));
        self
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl PassageIndex for MemoryIndex {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Passage>> {
        let wanted = terms(query);
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<Passage> = self
            .passages
            .iter()
            .filter_map(|(text, source)| {
                let have = terms(text);
                let matched = wanted.iter().filter(|t| have.contains(t)).count();
                (matched > 0).then(|| Passage {
                    text: text.clone(),
                    source: source.clone(),
                    score: matched as f32 / wanted.len() as f32,
                })
            })
            .collect();

        // Stable: equal scores keep insertion order
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn is_ready(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

//! Error Types for Travel Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TravelError>;

#[derive(Error, Debug)]
pub enum TravelError {
    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Knowledge index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

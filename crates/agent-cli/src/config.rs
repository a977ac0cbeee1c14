//! Command-line and environment configuration
//!
//! Every flag falls back to an environment variable (a `.env` file is
//! loaded first), then to a built-in default.

use std::time::Duration;

use clap::Parser;

use agent_runtime::OllamaConfig;
use travel_advisor::flights::SerpApiConfig;
use travel_advisor::retrieval::QdrantConfig;

#[derive(Parser, Debug)]
#[command(name = "travel-agent")]
#[command(about = "Conversational travel assistant: flight search and travel knowledge", long_about = None)]
pub struct Cli {
    /// Ollama host URL
    #[arg(long, env = "OLLAMA_HOST", default_value = "http://localhost")]
    pub ollama_host: String,

    /// Ollama port
    #[arg(long, env = "OLLAMA_PORT", default_value_t = 11434)]
    pub ollama_port: u16,

    /// Chat model used for reasoning
    #[arg(long, env = "CHAT_MODEL", default_value = "llama3.2")]
    pub model: String,

    /// Embedding model used for retrieval queries
    #[arg(long, env = "EMBED_MODEL", default_value = "nomic-embed-text")]
    pub embed_model: String,

    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6333")]
    pub qdrant_url: String,

    /// Collection holding the indexed travel documents
    #[arg(long, env = "QDRANT_COLLECTION", default_value = "travel_docs")]
    pub collection: String,

    #[arg(long, env = "QDRANT_API_KEY", hide_env_values = true)]
    pub qdrant_api_key: Option<String>,

    /// SerpApi key; without it flights come from the offline mock
    #[arg(long, env = "SERPAPI_API_KEY", hide_env_values = true)]
    pub serpapi_key: Option<String>,

    /// Currency for quoted prices
    #[arg(long, env = "CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Reason/act cycles allowed per question
    #[arg(long, env = "AGENT_MAX_ITERATIONS", default_value_t = 6)]
    pub max_iterations: usize,

    /// Timeout for each model call, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,

    /// Passages returned by a knowledge lookup
    #[arg(long, env = "RETRIEVAL_TOP_K", default_value_t = 3)]
    pub top_k: usize,

    /// Use the mock flight backend and a built-in document set
    #[arg(long)]
    pub demo: bool,
}

impl Cli {
    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfig {
            host: self.ollama_host.clone(),
            port: self.ollama_port,
            embedding_model: self.embed_model.clone(),
        }
    }

    pub fn qdrant_config(&self) -> QdrantConfig {
        QdrantConfig {
            url: self.qdrant_url.clone(),
            collection: self.collection.clone(),
            api_key: self.qdrant_api_key.clone().filter(|k| !k.is_empty()),
            ..Default::default()
        }
    }

    /// SerpApi settings, unless running in demo mode or without a key
    pub fn serpapi_config(&self) -> Option<SerpApiConfig> {
        if self.demo {
            return None;
        }
        let key = self.serpapi_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        let mut config = SerpApiConfig::new(key);
        config.currency = self.currency.to_uppercase();
        Some(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

//! # agent-runtime
//!
//! Runtime providers for the travel agent.
//!
//! ## Providers
//!
//! - **Ollama** (default): local chat completion and text embeddings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{OllamaConfig, OllamaProvider};
//!
//! let provider = Arc::new(OllamaProvider::from_config(OllamaConfig::default()));
//! let agent = AgentBuilder::new()
//!     .provider(provider.clone())
//!     .build()?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, EmbeddingProvider, LlmProvider, Message, Result, Role, Session, Tool,
    ToolRegistry,
};

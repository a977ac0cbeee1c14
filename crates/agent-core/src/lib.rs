//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction and extensible tool system.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Session                             │
//! │  ┌─────────────┐  ┌─────────────────────────────────────┐   │
//! │  │   History   │  │               Agent                 │   │
//! │  │ (turn log)  │──│  Reasoning ── Tools ── LlmProvider  │   │
//! │  │             │  │    Loop      Registry  (Strategy)   │   │
//! │  └─────────────┘  └─────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Ollama, OpenAI, Anthropic,
//! or any other provider without changing agent logic.

pub mod provider;
pub mod tool;
pub mod reasoning;
pub mod message;
pub mod history;
pub mod error;
pub mod session;

pub use error::{AgentError, FailureKind, Result};
pub use history::{History, Turn, TurnContent, TurnRole};
pub use message::{Message, Role};
pub use provider::{EmbeddingProvider, LlmProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, ReasoningStep};
pub use session::Session;
pub use tool::{Tool, ToolCall, ToolFailure, ToolRegistry, ToolResult, ToolSchema};

//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Loop-level failure classes reported to the person at the terminal.
///
/// Capability-local failures never appear here; they are folded into the
/// conversation as observations (see [`crate::tool::ToolFailure`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Too many reason/act cycles without a final answer
    ExhaustedIterations,
    /// The model produced neither a final answer nor well-formed tool calls
    MalformedResponse,
    /// The reasoning service could not be reached; history is cleared
    TransportFatal,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::ExhaustedIterations => write!(f, "exhausted-iterations"),
            FailureKind::MalformedResponse => write!(f, "malformed-response"),
            FailureKind::TransportFatal => write!(f, "transport-fatal"),
        }
    }
}

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Reasoning call exceeded its deadline
    #[error("Provider timed out after {0}s")]
    Timeout(u64),

    /// Tool name registered twice
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Maximum iterations reached in reasoning loop
    #[error("Maximum iterations ({0}) reached")]
    MaxIterations(usize),

    /// Model output is neither a final answer nor a well-formed tool call
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// History store invariant violated
    #[error("History error: {0}")]
    History(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Failures on the reasoning transport itself. The in-progress context
    /// can no longer be trusted, so the session history is cleared.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AgentError::Provider(_)
                | AgentError::ProviderUnavailable(_)
                | AgentError::Timeout(_)
                | AgentError::RateLimited(_)
                | AgentError::Auth(_)
                | AgentError::Io(_)
        )
    }

    /// Map onto the loop-level failure taxonomy, if this error belongs to it
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            AgentError::MaxIterations(_) => Some(FailureKind::ExhaustedIterations),
            AgentError::MalformedResponse(_) => Some(FailureKind::MalformedResponse),
            e if e.is_fatal() => Some(FailureKind::TransportFatal),
            _ => None,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Provider(msg) => format!(
                "The AI service encountered an error ({}). The conversation was reset.",
                msg
            ),
            AgentError::ProviderUnavailable(_) | AgentError::Io(_) => {
                "The AI service is currently unavailable. The conversation was reset.".into()
            }
            AgentError::Timeout(_) => {
                "The AI service did not answer in time. The conversation was reset.".into()
            }
            AgentError::MaxIterations(_) => {
                "I could not finish that request. Please try again or rephrase it.".into()
            }
            AgentError::MalformedResponse(_) => {
                "I produced an unusable answer. Please try again or rephrase it.".into()
            }
            AgentError::RateLimited(_) => {
                "You've made too many requests. Please wait a moment.".into()
            }
            AgentError::Auth(_) => "Authentication failed. Please check your credentials.".into(),
            AgentError::DuplicateTool(name) => format!("The tool '{}' is registered twice.", name),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Other(err.to_string())
    }
}

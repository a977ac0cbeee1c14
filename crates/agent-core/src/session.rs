//! Session Management
//!
//! A session owns one conversation history and one frozen agent for the
//! lifetime of an interactive run. History is only reachable through the
//! session; nothing outside can splice it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::history::{History, TurnContent};
use crate::reasoning::Agent;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An interactive agent session
pub struct Session {
    id: SessionId,
    agent: Agent,
    history: History,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session around a built agent
    pub fn new(agent: Agent) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            agent,
            history: History::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Send one user utterance through the agent loop.
    ///
    /// Turns are processed strictly one at a time; `&mut self` enforces it.
    pub async fn ask(&mut self, input: &str) -> Result<String> {
        let span = tracing::info_span!("turn", session = %self.id);
        let result = self
            .agent
            .run_turn(&mut self.history, input)
            .instrument(span)
            .await;
        self.touch();
        result
    }

    /// Forget the conversation, keeping the agent
    pub fn reset(&mut self) {
        self.history.clear();
        self.touch();
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Read-only view of the conversation
    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Update the activity timestamp
    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Title generated from the first user turn
    pub fn title(&self) -> String {
        self.history
            .snapshot()
            .iter()
            .find_map(|t| match t.content() {
                TurnContent::User(text) => Some(text),
                _ => None,
            })
            .map(|text| {
                let preview: String = text.chars().take(50).collect();
                if text.chars().count() > 50 {
                    format!("{}...", preview)
                } else {
                    preview
                }
            })
            .unwrap_or_else(|| format!("Session {}", self.id.0.chars().take(8).collect::<String>()))
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Number of turns recorded
    pub fn turn_count(&self) -> usize {
        self.history.len()
    }
}

//! Conversation History
//!
//! Append-only log of turns. Turns are never edited or reordered; the only
//! corrections are dropping the newest turns ([`History::rollback_last`]) or
//! wiping the log ([`History::clear`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::tool::{ToolCall, ToolResult};

/// Role of a turn in the history log
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnRole {
    User,
    Assistant,
    CapabilityRequest,
    CapabilityResult,
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
            TurnRole::CapabilityRequest => write!(f, "capability-request"),
            TurnRole::CapabilityResult => write!(f, "capability-result"),
        }
    }
}

/// Payload of a turn; the variant fixes the role
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "kebab-case")]
pub enum TurnContent {
    User(String),
    Assistant(String),
    CapabilityRequest(ToolCall),
    CapabilityResult(ToolResult),
}

impl TurnContent {
    pub fn role(&self) -> TurnRole {
        match self {
            TurnContent::User(_) => TurnRole::User,
            TurnContent::Assistant(_) => TurnRole::Assistant,
            TurnContent::CapabilityRequest(_) => TurnRole::CapabilityRequest,
            TurnContent::CapabilityResult(_) => TurnRole::CapabilityResult,
        }
    }
}

/// One immutable entry in the log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    seq: u64,
    timestamp: DateTime<Utc>,
    content: TurnContent,
}

impl Turn {
    /// Sequence index assigned at append time
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn role(&self) -> TurnRole {
        self.content.role()
    }

    pub fn content(&self) -> &TurnContent {
        &self.content
    }

    /// Short single-line rendering for logs and the `/history` command
    pub fn summary(&self) -> String {
        let body = match &self.content {
            TurnContent::User(text) | TurnContent::Assistant(text) => text.clone(),
            TurnContent::CapabilityRequest(call) => format!(
                "{} {}",
                call.name,
                serde_json::to_string(&call.arguments).unwrap_or_default()
            ),
            TurnContent::CapabilityResult(result) => result.observation(),
        };
        let line = body.replace('\n', " ");
        let preview: String = line.chars().take(100).collect();
        if line.chars().count() > 100 {
            format!("#{} {}: {}...", self.seq, self.role(), preview)
        } else {
            format!("#{} {}: {}", self.seq, self.role(), preview)
        }
    }

    /// Estimate token count (rough approximation)
    pub fn estimate_tokens(&self) -> u32 {
        let len = match &self.content {
            TurnContent::User(text) | TurnContent::Assistant(text) => text.len(),
            TurnContent::CapabilityRequest(call) => {
                call.name.len() + serde_json::to_string(&call.arguments).map_or(0, |s| s.len())
            }
            TurnContent::CapabilityResult(result) => result.observation().len(),
        };
        // ~4 characters per token, +4 for role overhead
        (len / 4) as u32 + 4
    }
}

/// Ordered, rollback-capable turn log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct History {
    turns: Vec<Turn>,
    next_seq: u64,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end, returning its sequence index
    pub fn append(&mut self, content: TurnContent) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.turns.push(Turn {
            seq,
            timestamp: Utc::now(),
            content,
        });
        seq
    }

    /// Current ordered sequence of turns
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    /// Remove the most recent `n` turns
    pub fn rollback_last(&mut self, n: usize) -> Result<()> {
        if n > self.turns.len() {
            return Err(AgentError::History(format!(
                "cannot roll back {} turns, only {} recorded",
                n,
                self.turns.len()
            )));
        }
        self.turns.truncate(self.turns.len() - n);
        Ok(())
    }

    /// Drop everything. Sequence indices keep increasing afterwards.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Estimate total tokens in the log
    pub fn estimate_tokens(&self) -> u32 {
        self.turns.iter().map(Turn::estimate_tokens).sum()
    }

    /// Tail of the log that fits `max_tokens`, cut only at user-turn
    /// boundaries. The newest exchange (from its user turn on) is always
    /// included even if it alone exceeds the budget.
    pub fn window(&self, max_tokens: u32) -> &[Turn] {
        let starts: Vec<usize> = self
            .turns
            .iter()
            .enumerate()
            .filter(|(_, t)| t.role() == TurnRole::User)
            .map(|(i, _)| i)
            .collect();

        let Some(&newest) = starts.last() else {
            return &self.turns;
        };

        let mut start = newest;
        let mut used: u32 = self.turns[newest..].iter().map(Turn::estimate_tokens).sum();

        for &candidate in starts.iter().rev().skip(1) {
            let extra: u32 = self.turns[candidate..start]
                .iter()
                .map(Turn::estimate_tokens)
                .sum();
            if used + extra > max_tokens {
                break;
            }
            used += extra;
            start = candidate;
        }

        // Anything before the first user turn is only kept if the whole log fits
        if start == starts[0] && self.estimate_tokens() <= max_tokens {
            start = 0;
        }

        &self.turns[start..]
    }
}

//! Line-oriented chat loop
//!
//! Reads one utterance per line, prints the answer or a failure notice.
//! `exit` or `quit` ends the session without touching the history.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use agent_core::Session;

/// One line of operator input
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Empty,
    Exit,
    Reset,
    History,
    Ask(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => Command::Empty,
            "exit" | "quit" => Command::Exit,
            "/reset" => Command::Reset,
            "/history" => Command::History,
            _ => Command::Ask(line),
        }
    }
}

/// Drive `session` from `input` until the exit sentinel or end of input
pub async fn run<R, W>(session: &mut Session, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    output
        .write_all(b"Travel assistant ready. Ask about flights or travel rules.\n")
        .await?;
    output
        .write_all(b"Commands: /history, /reset, exit\n")
        .await?;

    loop {
        output.write_all(b"\nyou> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Exit => break,
            Command::Reset => {
                session.reset();
                output.write_all(b"Conversation cleared.\n").await?;
            }
            Command::History => {
                if session.history().is_empty() {
                    output.write_all(b"(no turns yet)\n").await?;
                }
                for turn in session.history().snapshot() {
                    output.write_all(format!("{}\n", turn.summary()).as_bytes()).await?;
                }
            }
            Command::Ask(text) => match session.ask(text).await {
                Ok(answer) => {
                    output.write_all(format!("\nagent> {}\n", answer).as_bytes()).await?;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Turn failed");
                    let notice = match e.failure_kind() {
                        Some(kind) => format!("\n[{}] {}\n", kind, e.user_message()),
                        None => format!("\n[error] {}\n", e.user_message()),
                    };
                    output.write_all(notice.as_bytes()).await?;
                }
            },
        }
    }

    output.write_all(b"Goodbye.\n").await?;
    output.flush().await?;
    tracing::info!(session = %session.id(), turns = session.turn_count(), "Session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use agent_core::message::Message;
    use agent_core::provider::{Completion, GenerationOptions, ModelInfo, ProviderInfo};
    use agent_core::{AgentBuilder, AgentError, LlmProvider, Result};
    use async_trait::async_trait;

    /// Answers every question with its length; fails on "boom"
    struct CountingProvider;

    #[async_trait]
    impl LlmProvider for CountingProvider {
        async fn info(&self) -> Result<ProviderInfo> {
            Ok(ProviderInfo {
                name: "counting".into(),
                version: None,
                models: vec![],
                supports_tools: false,
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(&self, messages: &[Message], _options: &GenerationOptions) -> Result<Completion> {
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            if last == "boom" {
                return Err(AgentError::ProviderUnavailable("connection refused".into()));
            }
            Ok(Completion::text(format!("{} chars", last.len()), "counting"))
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(vec![])
        }
    }

    fn session() -> Session {
        let agent = AgentBuilder::new()
            .provider(Arc::new(CountingProvider))
            .build()
            .unwrap();
        Session::new(agent)
    }

    async fn drive(session: &mut Session, script: &str) -> String {
        let mut out = Vec::new();
        run(session, script.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("  EXIT "), Command::Exit);
        assert_eq!(Command::parse("quit"), Command::Exit);
        assert_eq!(Command::parse("/reset"), Command::Reset);
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(Command::parse(" exit now "), Command::Ask("exit now"));
    }

    #[tokio::test]
    async fn test_exit_stops_without_touching_history() {
        let mut session = session();
        let out = drive(&mut session, "hello\nexit\nnever asked\n").await;

        assert!(out.contains("agent> 5 chars"));
        assert!(out.contains("Goodbye."));
        assert!(!out.contains("11 chars"));
        assert_eq!(session.turn_count(), 2);
    }

    #[tokio::test]
    async fn test_history_and_reset_commands() {
        let mut session = session();
        let out = drive(&mut session, "hello\n/history\n/reset\n/history\n").await;

        assert!(out.contains("#0 user: hello"));
        assert!(out.contains("#1 assistant: 5 chars"));
        assert!(out.contains("Conversation cleared."));
        assert!(out.contains("(no turns yet)"));
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_fatal_failure_prints_notice_and_clears() {
        let mut session = session();
        let out = drive(&mut session, "hello\nboom\n").await;

        assert!(out.contains("[transport-fatal]"));
        assert_eq!(session.turn_count(), 0);
    }
}

//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern for agent behavior.
//! Per user turn the agent reasons, optionally dispatches tools, observes
//! their results and reasons again until it can answer.
//!
//! ```text
//! AWAITING_INPUT → REASONING → {DISPATCHING → OBSERVING → REASONING}* → ANSWERED | FAILED
//! ```
//!
//! On a non-fatal failure every turn appended during the user turn is
//! rolled back. On a transport failure the whole history is cleared.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AgentError, Result};
use crate::history::{History, Turn, TurnContent};
use crate::message::Message;
use crate::provider::{Completion, FinishReason, GenerationOptions, LlmProvider};
use crate::tool::{Tool, ToolCall, ToolRegistry};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template
    pub system_prompt: String,

    /// Maximum reason/act cycles per user turn
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to system prompt
    pub inject_tool_descriptions: bool,

    /// Deadline for a single reasoning call
    pub request_timeout: Duration,

    /// Deadline for a single tool execution
    pub tool_timeout: Duration,

    /// Token budget for the history part of the prompt
    pub max_context_tokens: u32,

    /// Run the tool calls of one step concurrently
    pub parallel_dispatch: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 6,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
            request_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(60),
            max_context_tokens: 6144,
            parallel_dispatch: true,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful AI assistant.

When you need to use a tool, respond with a JSON block in this exact format:
```tool
{"tool": "tool_name", "arguments": {"arg1": "value1"}}
```

After receiving tool results, synthesize them into a helpful response.
If you can answer directly without tools, do so.
Be concise and accurate."#;

/// States of the per-turn loop, used in log output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    AwaitingInput,
    Reasoning,
    Dispatching,
    Observing,
    Answered,
    Failed,
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoopState::AwaitingInput => "AWAITING_INPUT",
            LoopState::Reasoning => "REASONING",
            LoopState::Dispatching => "DISPATCHING",
            LoopState::Observing => "OBSERVING",
            LoopState::Answered => "ANSWERED",
            LoopState::Failed => "FAILED",
        };
        write!(f, "{}", name)
    }
}

/// What the model decided in one reasoning step
#[derive(Clone, Debug, PartialEq)]
pub enum ReasoningStep {
    /// Natural-language answer that ends the turn
    FinalAnswer(String),
    /// Tools to run before reasoning again, in request order
    Invoke(Vec<ToolCall>),
}

/// Contents of a ```tool block: one call or an array of calls
#[derive(Deserialize)]
#[serde(untagged)]
enum ToolBlock {
    One(ToolCall),
    Many(Vec<ToolCall>),
}

impl ToolBlock {
    fn into_calls(self) -> Vec<ToolCall> {
        match self {
            ToolBlock::One(call) => vec![call],
            ToolBlock::Many(calls) => calls,
        }
    }
}

const TOOL_BLOCK_START: &str = "```tool";
const TOOL_BLOCK_END: &str = "```";

impl ReasoningStep {
    /// Classify a completion. Native tool calls win; otherwise tool blocks
    /// are looked for in the text; otherwise the text is the answer.
    pub fn from_completion(completion: &Completion) -> Result<Self> {
        if completion.finish_reason == Some(FinishReason::Error) {
            return Err(AgentError::MalformedResponse(
                "provider reported a generation error".into(),
            ));
        }

        let calls = if !completion.tool_calls.is_empty() {
            Some(completion.tool_calls.clone())
        } else {
            match parse_tool_blocks(&completion.content)? {
                Some(calls) => Some(calls),
                None => parse_inline_tool_call(&completion.content).map(|call| vec![call]),
            }
        };

        match calls {
            Some(calls) => {
                if calls.is_empty() {
                    return Err(AgentError::MalformedResponse("empty tool call list".into()));
                }
                let mut calls = calls;
                for call in &mut calls {
                    if call.name.trim().is_empty() {
                        return Err(AgentError::MalformedResponse("tool call without a name".into()));
                    }
                    if call.id.is_none() {
                        call.id = Some(uuid::Uuid::new_v4().to_string());
                    }
                }
                Ok(ReasoningStep::Invoke(calls))
            }
            None => {
                let answer = completion.content.trim();
                if answer.is_empty() {
                    Err(AgentError::MalformedResponse("empty response".into()))
                } else {
                    Ok(ReasoningStep::FinalAnswer(answer.to_string()))
                }
            }
        }
    }
}

/// Collect every ```tool block. A block that is present but unreadable
/// makes the whole response malformed.
fn parse_tool_blocks(content: &str) -> Result<Option<Vec<ToolCall>>> {
    let mut calls = Vec::new();
    let mut found = false;
    let mut rest = content;

    while let Some(start_idx) = rest.find(TOOL_BLOCK_START) {
        found = true;
        let after_marker = &rest[start_idx + TOOL_BLOCK_START.len()..];
        let end_idx = after_marker
            .find(TOOL_BLOCK_END)
            .ok_or_else(|| AgentError::MalformedResponse("unterminated tool block".into()))?;

        let json_str = after_marker[..end_idx].trim();
        let block: ToolBlock = serde_json::from_str(json_str)
            .map_err(|e| AgentError::MalformedResponse(format!("unreadable tool block: {}", e)))?;
        calls.extend(block.into_calls());

        rest = &after_marker[end_idx + TOOL_BLOCK_END.len()..];
    }

    Ok(found.then_some(calls))
}

/// Fallback: a bare JSON object with a "tool" key somewhere in the text
fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str::<ToolCall>(&content[start..=end]).ok()
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Build the full system prompt including tool descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Render history turns into provider messages
    pub fn render_messages(&self, turns: &[Turn]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(Message::system(self.build_system_prompt()));

        for turn in turns {
            let message = match turn.content() {
                TurnContent::User(text) => Message::user(text.as_str()),
                TurnContent::Assistant(text) => Message::assistant(text.as_str()),
                TurnContent::CapabilityRequest(call) => {
                    let block = serde_json::json!({
                        "tool": call.name,
                        "arguments": call.arguments,
                    });
                    Message::assistant(format!("{}\n{}\n{}", TOOL_BLOCK_START, block, TOOL_BLOCK_END))
                }
                TurnContent::CapabilityResult(result) => {
                    Message::tool(result.observation(), result.id.clone())
                }
            };
            messages.push(message);
        }

        messages
    }

    /// Process one user turn against `history`.
    ///
    /// On success the history ends with the user turn, any tool
    /// request/result pairs and the assistant answer. On a non-fatal
    /// failure the history is restored to its length before the call; on a
    /// fatal one it is cleared.
    pub async fn run_turn(&self, history: &mut History, input: &str) -> Result<String> {
        let start_len = history.len();
        history.append(TurnContent::User(input.to_string()));

        match self.drive(history).await {
            Ok(answer) => {
                tracing::debug!(state = %LoopState::Answered, turns = history.len(), "Turn answered");
                Ok(answer)
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(state = %LoopState::Failed, error = %e, "Reasoning transport failed, clearing history");
                history.clear();
                Err(e)
            }
            Err(e) => {
                tracing::warn!(state = %LoopState::Failed, error = %e, "Turn failed, rolling back");
                let appended = history.len().saturating_sub(start_len);
                if let Err(rollback) = history.rollback_last(appended) {
                    tracing::error!(error = %rollback, "Rollback failed, clearing history");
                    history.clear();
                }
                Err(e)
            }
        }
    }

    async fn drive(&self, history: &mut History) -> Result<String> {
        for iteration in 1..=self.config.max_iterations {
            tracing::debug!(state = %LoopState::Reasoning, iteration, "Calling provider");
            let messages = self.render_messages(history.window(self.config.max_context_tokens));
            let completion = self.reason(&messages).await?;

            match ReasoningStep::from_completion(&completion)? {
                ReasoningStep::FinalAnswer(answer) => {
                    history.append(TurnContent::Assistant(answer.clone()));
                    return Ok(answer);
                }
                ReasoningStep::Invoke(calls) => {
                    tracing::debug!(
                        state = %LoopState::Dispatching,
                        tools = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                        "Executing tools"
                    );
                    let results = self
                        .tools
                        .dispatch_all(&calls, self.config.parallel_dispatch)
                        .await;

                    tracing::debug!(state = %LoopState::Observing, results = results.len(), "Recording observations");
                    for (call, result) in calls.into_iter().zip(results) {
                        history.append(TurnContent::CapabilityRequest(call));
                        history.append(TurnContent::CapabilityResult(result));
                    }
                }
            }
        }

        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    /// One bounded call to the provider. Any failure here is a transport failure.
    async fn reason(&self, messages: &[Message]) -> Result<Completion> {
        let timeout = self.config.request_timeout;
        let call = self.provider.complete(messages, &self.config.generation);

        match tokio::time::timeout(timeout, call).await {
            Err(_) => Err(AgentError::Timeout(timeout.as_secs())),
            Ok(Err(e)) if e.is_fatal() => Err(e),
            Ok(Err(e)) => Err(AgentError::Provider(e.to_string())),
            Ok(Ok(completion)) => Ok(completion),
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    pending: Vec<Arc<dyn Tool>>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            pending: Vec::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.pending.push(Arc::new(tool));
        self
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.config.tool_timeout = timeout;
        self
    }

    pub fn max_context_tokens(mut self, tokens: u32) -> Self {
        self.config.max_context_tokens = tokens;
        self
    }

    pub fn parallel_dispatch(mut self, parallel: bool) -> Self {
        self.config.parallel_dispatch = parallel;
        self
    }

    /// Freeze the tool catalog and build the agent
    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        let mut tools = ToolRegistry::new().with_timeout(self.config.tool_timeout);
        for tool in self.pending {
            tools.register_arc(tool)?;
        }

        Ok(Agent::new(provider, Arc::new(tools), self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::TurnRole;
    use crate::provider::{ModelInfo, ProviderInfo};
    use crate::tool::{DateTimeTool, ParameterSchema, ToolFailure, ToolResult, ToolSchema};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records what it was shown
    struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<Completion>>>,
        seen: Mutex<Vec<Vec<Message>>>,
        delay: Option<Duration>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<Completion>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        fn texts(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(Completion::text(*r, "test"))).collect())
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn info(&self) -> Result<ProviderInfo> {
            Ok(ProviderInfo {
                name: "scripted".into(),
                version: None,
                models: vec![],
                supports_tools: false,
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(&self, messages: &[Message], _options: &GenerationOptions) -> Result<Completion> {
            self.seen.lock().unwrap().push(messages.to_vec());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Completion::text("```tool\n{\"tool\": \"echo\"}\n```", "test")))
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(vec![])
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".into(),
                description: "Echo text back".into(),
                parameters: vec![ParameterSchema::optional("text", "string", "Text to echo")],
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            Ok(ToolResult::success("echo", call.str_arg("text").unwrap_or("")))
        }
    }

    fn agent(provider: Arc<ScriptedProvider>) -> Agent {
        AgentBuilder::new()
            .provider(provider)
            .tool(EchoTool)
            .tool(DateTimeTool)
            .max_iterations(3)
            .build()
            .unwrap()
    }

    fn roles(history: &History) -> Vec<TurnRole> {
        history.snapshot().iter().map(Turn::role).collect()
    }

    #[test]
    fn test_parse_tool_call() {
        let content = r#"Let me check that for you.
```tool
{"tool": "echo", "arguments": {"text": "hi"}}
```"#;
        let step = ReasoningStep::from_completion(&Completion::text(content, "m")).unwrap();
        match step {
            ReasoningStep::Invoke(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name, "echo");
                assert!(calls[0].id.is_some());
            }
            other => panic!("expected invocation, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_multiple_blocks_and_arrays() {
        let content = "```tool\n[{\"tool\": \"a\"}, {\"tool\": \"b\"}]\n```\nand\n```tool\n{\"tool\": \"c\"}\n```";
        let step = ReasoningStep::from_completion(&Completion::text(content, "m")).unwrap();
        let ReasoningStep::Invoke(calls) = step else {
            panic!("expected invocation");
        };
        let names: Vec<_> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_inline_and_native_calls() {
        let inline = r#"Sure: {"tool": "datetime", "arguments": {"format": "date"}}"#;
        let step = ReasoningStep::from_completion(&Completion::text(inline, "m")).unwrap();
        assert!(matches!(step, ReasoningStep::Invoke(ref c) if c[0].name == "datetime"));

        let mut native = Completion::text("", "m");
        native.tool_calls = vec![ToolCall::new("echo")];
        let step = ReasoningStep::from_completion(&native).unwrap();
        assert!(matches!(step, ReasoningStep::Invoke(ref c) if c.len() == 1));
    }

    #[test]
    fn test_parse_malformed_responses() {
        for bad in ["", "   \n", "```tool\n{\"tool\": \"echo\"", "```tool\nnot json\n```", "```tool\n[]\n```"] {
            let result = ReasoningStep::from_completion(&Completion::text(bad, "m"));
            assert!(
                matches!(result, Err(AgentError::MalformedResponse(_))),
                "{:?} should be malformed",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let provider = Arc::new(ScriptedProvider::texts(&["Paris is lovely in May."]));
        let agent = agent(provider.clone());
        let mut history = History::new();

        let answer = agent.run_turn(&mut history, "When to visit Paris?").await.unwrap();
        assert_eq!(answer, "Paris is lovely in May.");
        assert_eq!(roles(&history), vec![TurnRole::User, TurnRole::Assistant]);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_tool_round_trip_pairs_requests_and_results() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            "```tool\n[{\"tool\": \"echo\", \"arguments\": {\"text\": \"one\"}}, {\"tool\": \"echo\", \"arguments\": {\"text\": \"two\"}}]\n```",
            "Done.",
        ]));
        let agent = agent(provider.clone());
        let mut history = History::new();

        agent.run_turn(&mut history, "echo twice").await.unwrap();
        assert_eq!(
            roles(&history),
            vec![
                TurnRole::User,
                TurnRole::CapabilityRequest,
                TurnRole::CapabilityResult,
                TurnRole::CapabilityRequest,
                TurnRole::CapabilityResult,
                TurnRole::Assistant,
            ]
        );

        let turns = history.snapshot();
        let (TurnContent::CapabilityResult(first), TurnContent::CapabilityResult(second)) =
            (turns[2].content(), turns[4].content())
        else {
            panic!("expected results");
        };
        assert!(first.observation().ends_with("one"));
        assert!(second.observation().ends_with("two"));

        // Second reasoning call saw the observations
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[1].len(), 1 + 5);
        assert!(seen[1].last().unwrap().content.contains("two"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_observed_not_fatal() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            "```tool\n{\"tool\": \"book_hotel\", \"arguments\": {}}\n```",
            "I cannot book hotels.",
        ]));
        let agent = agent(provider);
        let mut history = History::new();

        let answer = agent.run_turn(&mut history, "book me a hotel").await.unwrap();
        assert_eq!(answer, "I cannot book hotels.");
        let TurnContent::CapabilityResult(result) = history.snapshot()[2].content() else {
            panic!("expected result turn");
        };
        assert_eq!(result.failure_kind(), Some(ToolFailure::UnknownCapability));
    }

    #[tokio::test]
    async fn test_odd_arguments_are_observed_not_malformed() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            "```tool\n[{\"tool\": \"datetime\", \"arguments\": null}, {\"tool\": \"echo\", \"arguments\": 7}]\n```",
            "Today is a fine day.",
        ]));
        let agent = agent(provider);
        let mut history = History::new();

        let answer = agent.run_turn(&mut history, "what day is it?").await.unwrap();
        assert_eq!(answer, "Today is a fine day.");
        assert_eq!(history.len(), 6);

        let turns = history.snapshot();
        let (TurnContent::CapabilityResult(date), TurnContent::CapabilityResult(echo)) =
            (turns[2].content(), turns[4].content())
        else {
            panic!("expected results");
        };
        assert!(date.is_success());
        assert_eq!(echo.failure_kind(), Some(ToolFailure::InvalidArguments));
    }

    #[tokio::test]
    async fn test_malformed_response_rolls_back() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            "Earlier answer.",
            "```tool\n{\"tool\": \"echo\", \"arguments\": {\"text\": \"x\"}}\n```",
            "   ",
        ]));
        let agent = agent(provider);
        let mut history = History::new();
        agent.run_turn(&mut history, "first").await.unwrap();
        let before = history.snapshot().to_vec();

        let err = agent.run_turn(&mut history, "second").await.unwrap_err();
        assert!(matches!(err, AgentError::MalformedResponse(_)));
        assert_eq!(history.snapshot(), before.as_slice());
    }

    #[tokio::test]
    async fn test_exhausted_iterations_rolls_back() {
        // Provider keeps asking for tools once the script runs out
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let agent = agent(provider.clone());
        let mut history = History::new();

        let err = agent.run_turn(&mut history, "loop forever").await.unwrap_err();
        assert!(matches!(err, AgentError::MaxIterations(3)));
        assert!(history.is_empty());
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_transport_failure_clears_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::text("One.", "m")),
            Ok(Completion::text("Two.", "m")),
            Err(AgentError::ProviderUnavailable("connection refused".into())),
        ]));
        let agent = agent(provider);
        let mut history = History::new();
        agent.run_turn(&mut history, "a").await.unwrap();
        agent.run_turn(&mut history, "b").await.unwrap();
        assert_eq!(history.len(), 4);

        let err = agent.run_turn(&mut history, "c").await.unwrap_err();
        assert!(err.is_fatal());
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_any_provider_error_is_transport_fatal() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(AgentError::Other("boom".into()))]));
        let agent = agent(provider);
        let mut history = History::new();

        let err = agent.run_turn(&mut history, "hello").await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_fatal() {
        let mut scripted = ScriptedProvider::texts(&["too late"]);
        scripted.delay = Some(Duration::from_millis(200));
        let agent = AgentBuilder::new()
            .provider(Arc::new(scripted))
            .request_timeout(Duration::from_millis(20))
            .build()
            .unwrap();
        let mut history = History::new();
        history.append(TurnContent::User("older".into()));
        history.append(TurnContent::Assistant("reply".into()));

        let err = agent.run_turn(&mut history, "hello").await.unwrap_err();
        assert!(matches!(err, AgentError::Timeout(_)));
        assert!(history.is_empty());
    }

    #[test]
    fn test_duplicate_tools_fail_build() {
        let result = AgentBuilder::new()
            .provider(Arc::new(ScriptedProvider::texts(&[])))
            .tool(EchoTool)
            .tool(EchoTool)
            .build();
        assert!(matches!(result, Err(AgentError::DuplicateTool(_))));
    }

    #[test]
    fn test_render_messages_includes_catalog() {
        let agent = agent(Arc::new(ScriptedProvider::texts(&[])));
        let mut history = History::new();
        history.append(TurnContent::User("hi".into()));
        history.append(TurnContent::CapabilityRequest(ToolCall::new("echo").with_arg("text", "x")));
        history.append(TurnContent::CapabilityResult(ToolResult::success("echo", "x").with_id("1")));

        let messages = agent.render_messages(history.snapshot());
        assert_eq!(messages.len(), 4);
        assert!(messages[0].content.contains("### echo"));
        assert!(messages[2].content.starts_with("```tool"));
        assert_eq!(messages[3].tool_call_id.as_deref(), Some("1"));
    }
}

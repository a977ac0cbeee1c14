//! Full turn through the agent loop with the travel tools and a scripted model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use agent_core::message::Message;
use agent_core::provider::{Completion, GenerationOptions, ModelInfo, ProviderInfo};
use agent_core::tool::DateTimeTool;
use agent_core::{AgentBuilder, LlmProvider, Result, Session, ToolFailure, TurnContent, TurnRole};
use travel_advisor::flights::MockFlightClient;
use travel_advisor::retrieval::MemoryIndex;
use travel_advisor::tools::{FlightSearchTool, KnowledgeBaseTool};
use travel_advisor::TRAVEL_ADVISOR_PROMPT;

/// Replays canned completions and records every prompt it was sent
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn last_prompt(&self) -> Vec<Message> {
        self.seen.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedModel {
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
        let reply = self.replies.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Completion::text(reply, "scripted"))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![])
    }
}

fn session(model: Arc<ScriptedModel>, flights: MockFlightClient) -> Session {
    let index = MemoryIndex::new().with_passage(
        "Passengers flying within the Schengen area need a valid ID card or passport.",
        Some("schengen.md"),
    );

    let agent = AgentBuilder::new()
        .provider(model)
        .system_prompt(TRAVEL_ADVISOR_PROMPT)
        .tool(DateTimeTool)
        .tool(FlightSearchTool::new(Arc::new(flights)))
        .tool(KnowledgeBaseTool::new(Arc::new(index)))
        .build()
        .unwrap();

    Session::new(agent)
}

const SEARCH_CALL: &str = "```tool\n{\"tool\": \"flight_search\", \"arguments\": {\"origin\": \"WRO\", \"destination\": \"WAW\", \"outbound_date\": \"2025-06-01\"}}\n```";

#[tokio::test]
async fn test_flight_question_end_to_end() {
    let model = Arc::new(ScriptedModel::new(&[
        SEARCH_CALL,
        "The cheapest flight from WRO to WAW on 2025-06-01 is LOT at 89 USD.",
    ]));
    let mut session = session(model.clone(), MockFlightClient::with_offers(8));

    let answer = session.ask("flights from WRO to WAW on 2025-06-01").await.unwrap();
    assert!(answer.contains("89 USD"));

    let roles: Vec<TurnRole> = session.history().snapshot().iter().map(|t| t.role()).collect();
    assert_eq!(
        roles,
        vec![
            TurnRole::User,
            TurnRole::CapabilityRequest,
            TurnRole::CapabilityResult,
            TurnRole::Assistant,
        ]
    );

    let turns = session.history().snapshot();
    match turns[1].content() {
        TurnContent::CapabilityRequest(call) => {
            assert_eq!(call.name, "flight_search");
            assert_eq!(call.str_arg("origin"), Some("WRO"));
            assert_eq!(call.str_arg("destination"), Some("WAW"));
            assert_eq!(call.str_arg("outbound_date"), Some("2025-06-01"));
        }
        other => panic!("expected capability request, got {:?}", other),
    }
    match turns[2].content() {
        TurnContent::CapabilityResult(result) => {
            assert!(result.is_success());
            let flights = result.data().unwrap()["flights"].as_array().unwrap();
            assert_eq!(flights.len(), 5);
        }
        other => panic!("expected capability result, got {:?}", other),
    }

    // The second reasoning step saw the pruned observation
    let prompt = model.last_prompt();
    let observation = &prompt.last().unwrap().content;
    assert!(observation.contains("Top 5 of 8 flights for WRO to WAW on 2025-06-01"));
}

#[tokio::test]
async fn test_upstream_failure_reaches_the_model() {
    let model = Arc::new(ScriptedModel::new(&[
        SEARCH_CALL,
        "The flight search service is unavailable right now.",
    ]));
    let mut session = session(model.clone(), MockFlightClient::failing("Invalid API key"));

    session.ask("flights from WRO to WAW on 2025-06-01").await.unwrap();

    match session.history().snapshot()[2].content() {
        TurnContent::CapabilityResult(result) => {
            assert_eq!(result.failure_kind(), Some(ToolFailure::UpstreamError));
        }
        other => panic!("expected capability result, got {:?}", other),
    }
    assert!(model.last_prompt().last().unwrap().content.contains("Invalid API key"));
}

#[tokio::test]
async fn test_missing_date_is_reported_then_answered() {
    let model = Arc::new(ScriptedModel::new(&[
        "```tool\n{\"tool\": \"flight_search\", \"arguments\": {\"origin\": \"WRO\", \"destination\": \"WAW\"}}\n```",
        "Which date would you like to fly?",
    ]));
    let mut session = session(model.clone(), MockFlightClient::new());

    let answer = session.ask("flights from WRO to WAW").await.unwrap();
    assert_eq!(answer, "Which date would you like to fly?");

    match session.history().snapshot()[2].content() {
        TurnContent::CapabilityResult(result) => {
            assert_eq!(result.failure_kind(), Some(ToolFailure::InvalidArguments));
            assert!(result.observation().contains("outbound_date"));
        }
        other => panic!("expected capability result, got {:?}", other),
    }
}

#[tokio::test]
async fn test_knowledge_lookup_and_follow_up() {
    let model = Arc::new(ScriptedModel::new(&[
        "```tool\n{\"tool\": \"travel_knowledge\", \"arguments\": {\"query\": \"Schengen passport\"}}\n```",
        "An ID card is enough inside Schengen.",
        "```tool\n{\"tool\": \"travel_knowledge\", \"arguments\": {\"query\": \"ski pass\"}}\n```",
        "I have no information about ski passes.",
    ]));
    let mut session = session(model.clone(), MockFlightClient::new());

    session.ask("Do I need a passport to fly to Warsaw?").await.unwrap();
    assert!(model.last_prompt().last().unwrap().content.contains("schengen.md"));

    session.ask("And ski passes?").await.unwrap();
    assert!(model
        .last_prompt()
        .last()
        .unwrap()
        .content
        .contains("No matching passages found"));
    assert_eq!(session.turn_count(), 8);
}

//! travel-agent
//!
//! Terminal front end: checks the model server and document index are
//! reachable, then runs one interactive session on stdin/stdout.
//! Logs go to stderr.

mod config;
mod repl;

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::tool::DateTimeTool;
use agent_core::{AgentBuilder, LlmProvider, Session};
use agent_runtime::OllamaProvider;
use travel_advisor::flights::{FlightSearchClient, MockFlightClient, SerpApiClient};
use travel_advisor::retrieval::{MemoryIndex, PassageIndex, QdrantIndex};
use travel_advisor::tools::{FlightSearchTool, KnowledgeBaseTool};
use travel_advisor::TRAVEL_ADVISOR_PROMPT;

use crate::config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before parsing so flags can fall back to it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn,agent_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Reasoning service must be up before the session starts
    let provider = Arc::new(OllamaProvider::from_config(cli.ollama_config()));
    let ollama = provider.config();
    match provider.health_check().await {
        Ok(true) => tracing::info!(host = %ollama.host, port = ollama.port, model = %cli.model, "Connected to Ollama"),
        Ok(false) | Err(_) => bail!(
            "Ollama is not reachable at {}:{}. Start it with `ollama serve`.",
            ollama.host,
            ollama.port
        ),
    }

    let flights: Arc<dyn FlightSearchClient> = match cli.serpapi_config() {
        Some(config) => Arc::new(SerpApiClient::new(config).context("building SerpApi client")?),
        None => {
            tracing::warn!("SERPAPI_API_KEY not set, using mock flight data");
            Arc::new(MockFlightClient::new())
        }
    };

    let index: Arc<dyn PassageIndex> = if cli.demo {
        Arc::new(demo_index())
    } else {
        let qdrant = QdrantIndex::new(cli.qdrant_config(), provider.clone())
            .context("building Qdrant client")?;
        let ready = qdrant
            .is_ready()
            .await
            .with_context(|| format!("Qdrant is not reachable at {}", cli.qdrant_url))?;
        if !ready {
            bail!(
                "Collection '{}' does not exist in Qdrant. Index the travel documents first.",
                cli.collection
            );
        }
        Arc::new(qdrant)
    };

    tracing::info!(flights = flights.name(), index = index.name(), "Backends ready");

    let agent = AgentBuilder::new()
        .provider(provider)
        .system_prompt(TRAVEL_ADVISOR_PROMPT)
        .model(cli.model.as_str())
        .max_iterations(cli.max_iterations)
        .request_timeout(cli.request_timeout())
        .tool_timeout(cli.request_timeout())
        .tool(DateTimeTool)
        .tool(FlightSearchTool::new(flights))
        .tool(KnowledgeBaseTool::new(index).with_top_k(cli.top_k))
        .build()?;

    tracing::info!(tools = ?agent.tools().names(), "Agent ready");

    let mut session = Session::new(agent);
    repl::run(&mut session, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Small built-in document set for `--demo`
fn demo_index() -> MemoryIndex {
    MemoryIndex::new()
        .with_passage(
            "Citizens of EU and Schengen countries can fly within the Schengen area with a valid national ID card. \
             Other travellers need a passport valid for at least three months after the planned departure.",
            Some("entry-requirements.md"),
        )
        .with_passage(
            "Most European low-cost carriers include one small under-seat bag (40x30x20 cm). \
             Cabin trolleys and checked baggage are paid extras.",
            Some("baggage.md"),
        )
        .with_passage(
            "Warsaw Chopin Airport (WAW) is 10 km from the city centre. Trains S2 and S3 reach the centre in about 25 minutes.",
            Some("warsaw.md"),
        )
        .with_passage(
            "Wroclaw Airport (WRO) is served by bus line 106 to the main railway station, a ride of roughly 35 minutes.",
            Some("wroclaw.md"),
        )
}

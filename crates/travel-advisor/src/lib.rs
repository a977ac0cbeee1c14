//! # travel-advisor
//!
//! Travel domain for the agent: flight search and retrieval over travel
//! documents, exposed as tools the reasoning loop can call.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  flight_search ──► FlightSearchClient ──► SerpApi | Mock      │
//! │       └─ top 5 offers, fixed fields                           │
//! │                                                               │
//! │  travel_knowledge ──► PassageIndex ──► Qdrant | Memory        │
//! │       └─ top-k passages, or an explicit "no match"            │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod svckit;
pub mod flights;
pub mod retrieval;
pub mod model;
pub mod error;

pub use error::{TravelError, Result};
pub use model::{FlightOffer, FlightQuery, FlightSummary, Passage, TripType};
pub use flights::FlightSearchClient;
pub use retrieval::PassageIndex;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        FlightSearchTool,
        KnowledgeBaseTool,
    };
}

/// System prompt for the travel agent
pub const TRAVEL_ADVISOR_PROMPT: &str = r#"You are a helpful travel assistant. You find flights and answer questions about travel rules using the tools below.

## How to Work

1. Flight requests need an origin, a destination and an outbound date. Ask the user for anything missing instead of guessing.
2. Use IATA airport codes (WRO, WAW, LHR). Convert city names yourself when the airport is unambiguous.
3. Dates must be absolute (YYYY-MM-DD). For "tomorrow" or "next Friday", call `datetime` first.
4. For visa, baggage, airline policy or destination questions, call `travel_knowledge` before answering.
5. If a tool reports an error, explain it plainly or fix the arguments and try again. Never invent flights, prices or rules.

## Presenting Flights

- Summarize the offers you received: price, airline, times, duration and stops.
- Point out the cheapest and the fastest option.
- If no flights were found, say so and suggest nearby dates or airports.

## Tools Available

- `flight_search` - Search flights between two airports on a given date
- `travel_knowledge` - Look up travel documents (visas, baggage, policies)
- `datetime` - Get today's date to resolve relative dates

Keep answers short and concrete."#;

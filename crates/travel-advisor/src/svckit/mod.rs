//! Service Kit - Agent Tools
//!
//! Travel tools that implement `agent_core::Tool`.

mod flight_search;
mod knowledge_base;

pub use flight_search::FlightSearchTool;
pub use knowledge_base::KnowledgeBaseTool;

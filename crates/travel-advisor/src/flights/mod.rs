//! Flight Search Integration
//!
//! Abstractions and implementations for flight search backends.

mod mock;
mod serpapi;

pub use mock::MockFlightClient;
pub use serpapi::{SerpApiClient, SerpApiConfig};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{FlightOffer, FlightQuery};

/// Flight search client trait (Strategy pattern)
///
/// Implement this for each backend: SerpApi Google Flights, Amadeus, Kiwi, etc.
#[async_trait]
pub trait FlightSearchClient: Send + Sync {
    /// Search offers, best first
    async fn search(&self, query: &FlightQuery) -> Result<Vec<FlightOffer>>;

    /// Backend name
    fn name(&self) -> &str;
}

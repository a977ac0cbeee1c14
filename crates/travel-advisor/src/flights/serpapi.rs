//! SerpApi Google Flights client

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::FlightSearchClient;
use crate::error::{Result, TravelError};
use crate::model::{FlightOffer, FlightQuery, TripType};

const SERPAPI_URL: &str = "https://serpapi.com/search.json";

/// SerpApi client configuration
#[derive(Clone, Debug)]
pub struct SerpApiConfig {
    pub api_key: String,
    pub base_url: String,
    /// ISO currency for quoted prices
    pub currency: String,
    /// Interface language passed as `hl`
    pub language: String,
    pub timeout: Duration,
}

impl SerpApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: SERPAPI_URL.into(),
            currency: "USD".into(),
            language: "en".into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Google Flights search through SerpApi
pub struct SerpApiClient {
    client: reqwest::Client,
    config: SerpApiConfig,
}

impl SerpApiClient {
    pub fn new(config: SerpApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn query_params(&self, query: &FlightQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("engine", "google_flights".to_string()),
            ("departure_id", query.origin.clone()),
            ("arrival_id", query.destination.clone()),
            ("outbound_date", query.outbound_date.format("%Y-%m-%d").to_string()),
            ("currency", self.config.currency.clone()),
            ("hl", self.config.language.clone()),
        ];

        match query.return_date {
            Some(back) => {
                params.push(("type", "1".into()));
                params.push(("return_date", back.format("%Y-%m-%d").to_string()));
            }
            None => params.push(("type", "2".into())),
        }

        params
    }
}

#[async_trait]
impl FlightSearchClient for SerpApiClient {
    async fn search(&self, query: &FlightQuery) -> Result<Vec<FlightOffer>> {
        tracing::debug!(%query, "Searching flights via SerpApi");

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&self.query_params(query))
            .query(&[("api_key", self.config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // SerpApi puts the reason in an `error` field even on HTTP errors
            let reason = serde_json::from_str::<SerpResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("SerpApi returned status {}", status));
            return Err(TravelError::Upstream(reason));
        }

        parse_offers(&body, query, &self.config.currency)
    }

    fn name(&self) -> &str {
        "SerpApi Google Flights"
    }
}

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    best_flights: Vec<SerpItinerary>,
    #[serde(default)]
    other_flights: Vec<SerpItinerary>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpItinerary {
    #[serde(default)]
    flights: Vec<SerpLeg>,
    total_duration: Option<u32>,
    price: Option<serde_json::Number>,
    #[serde(rename = "type")]
    trip_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpLeg {
    departure_airport: SerpAirport,
    arrival_airport: SerpAirport,
    airline: Option<String>,
    travel_class: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpAirport {
    time: Option<String>,
}

/// Turn a SerpApi response body into offers, best flights first
fn parse_offers(body: &str, query: &FlightQuery, currency: &str) -> Result<Vec<FlightOffer>> {
    let response: SerpResponse = serde_json::from_str(body)?;

    if let Some(error) = response.error {
        return Err(TravelError::Upstream(error));
    }

    Ok(response
        .best_flights
        .into_iter()
        .chain(response.other_flights)
        .filter(|it| !it.flights.is_empty())
        .map(|it| itinerary_to_offer(it, query, currency))
        .collect())
}

fn itinerary_to_offer(itinerary: SerpItinerary, query: &FlightQuery, currency: &str) -> FlightOffer {
    let mut carriers: Vec<String> = Vec::new();
    for airline in itinerary.flights.iter().filter_map(|l| l.airline.clone()) {
        if !carriers.contains(&airline) {
            carriers.push(airline);
        }
    }

    let departure_time = itinerary
        .flights
        .first()
        .and_then(|l| l.departure_airport.time.clone())
        .unwrap_or_default();
    let arrival_time = itinerary
        .flights
        .last()
        .and_then(|l| l.arrival_airport.time.clone())
        .unwrap_or_default();

    let trip_type = match itinerary.trip_type.as_deref().map(str::to_lowercase).as_deref() {
        Some("round trip") => TripType::RoundTrip,
        Some("one way") => TripType::OneWay,
        _ => query.trip_type(),
    };

    FlightOffer {
        price: itinerary
            .price
            .and_then(|n| Decimal::from_str(&n.to_string()).ok()),
        currency: currency.to_string(),
        carriers,
        departure_time,
        arrival_time,
        duration_minutes: itinerary.total_duration,
        stops: itinerary.flights.len().saturating_sub(1) as u32,
        trip_type,
        travel_class: itinerary.flights.first().and_then(|l| l.travel_class.clone()),
    }
}

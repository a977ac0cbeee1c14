//! Mock Flight Client
//!
//! For testing and demo purposes. Returns deterministic offers derived from the query.

use async_trait::async_trait;
use chrono::{NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::FlightSearchClient;
use crate::error::{Result, TravelError};
use crate::model::{FlightOffer, FlightQuery};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

const CARRIERS: [&str; 6] = ["LOT", "Ryanair", "Wizz Air", "Lufthansa", "KLM", "Buzz"];

/// Mock flight client with static offers
pub struct MockFlightClient {
    offers: usize,
    failure: Option<String>,
}

impl Default for MockFlightClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFlightClient {
    pub fn new() -> Self {
        Self::with_offers(8)
    }

    /// Return exactly `offers` offers per search
    pub fn with_offers(offers: usize) -> Self {
        Self { offers, failure: None }
    }

    /// Fail every search with an upstream error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            offers: 0,
            failure: Some(message.into()),
        }
    }

    fn offer(query: &FlightQuery, i: usize) -> FlightOffer {
        let stops = (i % 3) as u32;
        let depart_minutes = 6 * 60 + (i as u32 * 95) % (16 * 60);
        let duration = 65 + stops * 110 + (i as u32 % 2) * 15;
        let midnight = query.outbound_date.and_time(NaiveTime::MIN);
        let departure = midnight + TimeDelta::minutes(i64::from(depart_minutes));
        // Late departures land on the next day
        let arrival = departure + TimeDelta::minutes(i64::from(duration));

        let mut carriers = vec![CARRIERS[i % CARRIERS.len()].to_string()];
        if stops > 0 {
            let partner = CARRIERS[(i + 3) % CARRIERS.len()].to_string();
            if !carriers.contains(&partner) {
                carriers.push(partner);
            }
        }

        FlightOffer {
            price: Some(dec!(89) + Decimal::from(i as u32 * 23)),
            currency: "USD".into(),
            carriers,
            departure_time: departure.format(TIME_FORMAT).to_string(),
            arrival_time: arrival.format(TIME_FORMAT).to_string(),
            duration_minutes: Some(duration),
            stops,
            trip_type: query.trip_type(),
            travel_class: Some("Economy".into()),
        }
    }
}

#[async_trait]
impl FlightSearchClient for MockFlightClient {
    async fn search(&self, query: &FlightQuery) -> Result<Vec<FlightOffer>> {
        if let Some(message) = &self.failure {
            return Err(TravelError::Upstream(message.clone()));
        }
        Ok((0..self.offers).map(|i| Self::offer(query, i)).collect())
    }

    fn name(&self) -> &str {
        "MockFlights"
    }
}

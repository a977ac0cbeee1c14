//! Domain Models
//!
//! Flight search queries and offers, and knowledge base passages.
//! Prices use `rust_decimal`; never f64 for money.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TravelError};

/// One-way or return journey
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

impl std::fmt::Display for TripType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TripType::OneWay => write!(f, "one-way"),
            TripType::RoundTrip => write!(f, "round-trip"),
        }
    }
}

/// Normalized flight search request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightQuery {
    /// Origin airport code or city, upper-cased
    pub origin: String,

    /// Destination airport code or city, upper-cased
    pub destination: String,

    pub outbound_date: NaiveDate,

    pub return_date: Option<NaiveDate>,
}

impl FlightQuery {
    pub fn new(
        origin: impl AsRef<str>,
        destination: impl AsRef<str>,
        outbound_date: NaiveDate,
    ) -> Result<Self> {
        let origin = origin.as_ref().trim().to_uppercase();
        let destination = destination.as_ref().trim().to_uppercase();

        if origin.is_empty() || destination.is_empty() {
            return Err(TravelError::InvalidQuery("origin and destination are required".into()));
        }
        if origin == destination {
            return Err(TravelError::InvalidQuery(format!(
                "origin and destination are both {}",
                origin
            )));
        }

        Ok(Self {
            origin,
            destination,
            outbound_date,
            return_date: None,
        })
    }

    /// Add a return date; it may not precede the outbound date
    pub fn with_return(mut self, return_date: NaiveDate) -> Result<Self> {
        if return_date < self.outbound_date {
            return Err(TravelError::InvalidQuery(format!(
                "return date {} is before outbound date {}",
                return_date, self.outbound_date
            )));
        }
        self.return_date = Some(return_date);
        Ok(self)
    }

    pub fn trip_type(&self) -> TripType {
        if self.return_date.is_some() {
            TripType::RoundTrip
        } else {
            TripType::OneWay
        }
    }
}

impl std::fmt::Display for FlightQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {} on {}", self.origin, self.destination, self.outbound_date)?;
        if let Some(back) = self.return_date {
            write!(f, ", returning {}", back)?;
        }
        Ok(())
    }
}

/// A flight offer as returned by a search backend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightOffer {
    /// Total price, if the backend quoted one
    pub price: Option<Decimal>,

    pub currency: String,

    /// Operating airlines, in leg order, without repeats
    pub carriers: Vec<String>,

    /// Departure of the first leg, local time as quoted
    pub departure_time: String,

    /// Arrival of the last leg, local time as quoted
    pub arrival_time: String,

    pub duration_minutes: Option<u32>,

    /// Number of intermediate stops (legs - 1)
    pub stops: u32,

    pub trip_type: TripType,

    /// Cabin class of the first leg, if reported. Kept apart from `stops`.
    pub travel_class: Option<String>,
}

/// Fixed projection of an offer handed to the model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub price: Option<Decimal>,
    pub currency: String,
    pub carrier: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub stops: u32,
    pub trip_type: TripType,
}

impl From<&FlightOffer> for FlightSummary {
    fn from(offer: &FlightOffer) -> Self {
        let carrier = if offer.carriers.is_empty() {
            "unknown carrier".to_string()
        } else {
            offer.carriers.join(" / ")
        };

        Self {
            price: offer.price,
            currency: offer.currency.clone(),
            carrier,
            departure_time: offer.departure_time.clone(),
            arrival_time: offer.arrival_time.clone(),
            duration: offer
                .duration_minutes
                .map(format_duration)
                .unwrap_or_else(|| "unknown".into()),
            stops: offer.stops,
            trip_type: offer.trip_type,
        }
    }
}

impl FlightSummary {
    /// One-line rendering, e.g. `129 USD | LOT | 06:15 → 07:20 | 1h 05m | nonstop | one-way`
    pub fn line(&self) -> String {
        let price = match self.price {
            Some(p) => format!("{} {}", p.round_dp(2).normalize(), self.currency),
            None => "price n/a".into(),
        };
        let stops = match self.stops {
            0 => "nonstop".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{} stops", n),
        };
        format!(
            "{} | {} | {} → {} | {} | {} | {}",
            price, self.carrier, self.departure_time, self.arrival_time, self.duration, stops, self.trip_type
        )
    }
}

/// Render minutes as `XhYYm`
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

/// A passage returned by the knowledge index
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,

    /// Originating document, if known
    pub source: Option<String>,

    /// Similarity score (higher is closer)
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_query_normalization() {
        let query = FlightQuery::new(" wro ", "waw", date("2025-06-01")).unwrap();
        assert_eq!(query.origin, "WRO");
        assert_eq!(query.destination, "WAW");
        assert_eq!(query.trip_type(), TripType::OneWay);
        assert_eq!(query.to_string(), "WRO to WAW on 2025-06-01");
    }

    #[test]
    fn test_query_rejects_bad_input() {
        assert!(FlightQuery::new("WAW", "waw", date("2025-06-01")).is_err());
        let query = FlightQuery::new("WRO", "WAW", date("2025-06-10")).unwrap();
        assert!(query.clone().with_return(date("2025-06-01")).is_err());
        let round = query.with_return(date("2025-06-10")).unwrap();
        assert_eq!(round.trip_type(), TripType::RoundTrip);
    }

    #[test]
    fn test_summary_projection() {
        let offer = FlightOffer {
            price: Some(dec!(129)),
            currency: "USD".into(),
            carriers: vec!["LOT".into(), "Lufthansa".into()],
            departure_time: "2025-06-01 06:15".into(),
            arrival_time: "2025-06-01 11:20".into(),
            duration_minutes: Some(305),
            stops: 1,
            trip_type: TripType::OneWay,
            travel_class: Some("Business".into()),
        };
        let summary = FlightSummary::from(&offer);
        assert_eq!(summary.carrier, "LOT / Lufthansa");
        assert_eq!(summary.duration, "5h 05m");
        assert_eq!(summary.stops, 1);
        assert_eq!(
            summary.line(),
            "129 USD | LOT / Lufthansa | 2025-06-01 06:15 → 2025-06-01 11:20 | 5h 05m | 1 stop | one-way"
        );
    }
}

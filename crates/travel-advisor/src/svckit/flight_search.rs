//! Flight Search Tool
//!
//! Searches flights through a [`FlightSearchClient`] and hands the model a
//! small, fixed-shape summary of the best offers.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use agent_core::{
    tool::{ParameterSchema, ValidationError},
    Result as CoreResult, Tool, ToolCall, ToolFailure, ToolResult, ToolSchema,
};

use crate::flights::FlightSearchClient;
use crate::model::{FlightQuery, FlightSummary};

const NAME: &str = "flight_search";

/// Offers handed back to the model per search
pub const MAX_RESULTS: usize = 5;

pub struct FlightSearchTool {
    client: Arc<dyn FlightSearchClient>,
}

impl FlightSearchTool {
    pub fn new(client: Arc<dyn FlightSearchClient>) -> Self {
        Self { client }
    }

    /// Build the query from schema-checked arguments
    fn query(call: &ToolCall) -> Result<FlightQuery, ValidationError> {
        let date = |field: &str| -> Result<Option<NaiveDate>, ValidationError> {
            call.str_arg(field)
                .map(|s| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                        ValidationError::new(NAME, field, format!("`{}` must be a date in YYYY-MM-DD format", field))
                    })
                })
                .transpose()
        };

        let outbound = date("outbound_date")?.ok_or_else(|| {
            ValidationError::new(NAME, "outbound_date", "missing required field `outbound_date`")
        })?;

        let query = FlightQuery::new(
            call.str_arg("origin").unwrap_or_default(),
            call.str_arg("destination").unwrap_or_default(),
            outbound,
        )
        .map_err(|e| ValidationError::new(NAME, "destination", e.to_string()))?;

        match date("return_date")? {
            Some(back) => query
                .with_return(back)
                .map_err(|e| ValidationError::new(NAME, "return_date", e.to_string())),
            None => Ok(query),
        }
    }
}

#[async_trait]
impl Tool for FlightSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Search flights between two airports. Use IATA codes (e.g. WRO, WAW) and \
                          absolute dates; returns the 5 best offers with price, carrier, times, \
                          duration, stops and trip type."
                .into(),
            parameters: vec![
                ParameterSchema::required("origin", "string", "Departure airport IATA code, e.g. 'WRO'"),
                ParameterSchema::required("destination", "string", "Arrival airport IATA code, e.g. 'WAW'"),
                ParameterSchema::required("outbound_date", "string", "Departure date, YYYY-MM-DD").date(),
                ParameterSchema::optional(
                    "return_date",
                    "string",
                    "Return date for a round trip, YYYY-MM-DD; omit for one-way",
                )
                .date(),
            ],
        }
    }

    fn validate(&self, call: &ToolCall) -> Result<(), ValidationError> {
        self.schema().validate(&call.arguments)?;
        Self::query(call).map(|_| ())
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = match Self::query(call) {
            Ok(q) => q,
            Err(e) => return Ok(ToolResult::failure(NAME, ToolFailure::InvalidArguments, e.to_string())),
        };

        tracing::info!(backend = self.client.name(), %query, "Searching flights");

        let offers = match self.client.search(&query).await {
            Ok(offers) => offers,
            Err(e) => {
                tracing::warn!(backend = self.client.name(), error = %e, "Flight search failed");
                return Ok(ToolResult::failure(NAME, ToolFailure::UpstreamError, e.to_string()));
            }
        };

        if offers.is_empty() {
            return Ok(ToolResult::success(
                NAME,
                format!("No flights found for {}.", query),
            )
            .with_data(json!({ "flights": [] })));
        }

        let summaries: Vec<FlightSummary> = offers.iter().take(MAX_RESULTS).map(FlightSummary::from).collect();

        let mut output = format!("Top {} of {} flights for {}:\n", summaries.len(), offers.len(), query);
        for (i, summary) in summaries.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, summary.line()));
        }

        Ok(ToolResult::success(NAME, output.trim_end()).with_data(json!({ "flights": summaries })))
    }
}

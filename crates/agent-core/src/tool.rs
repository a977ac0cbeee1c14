//! Tool System
//!
//! Capabilities the model can invoke. Each tool declares a schema; the
//! registry validates arguments against it before execution and folds every
//! failure into a [`ToolResult`] so dispatch never aborts the reasoning loop.

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AgentError, Result};

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawToolCall")]
pub struct ToolCall {
    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs, not yet validated
    pub arguments: HashMap<String, serde_json::Value>,

    /// Optional call ID for tracking
    pub id: Option<String>,

    /// Arguments that arrived as something other than a JSON object.
    /// Dispatch reports these as invalid instead of running the tool.
    #[serde(skip_serializing)]
    pub rejected_arguments: Option<serde_json::Value>,
}

/// Wire shape of a call before argument normalisation
#[derive(Deserialize)]
struct RawToolCall {
    #[serde(alias = "tool")]
    name: String,
    #[serde(default, alias = "args")]
    arguments: serde_json::Value,
    #[serde(default)]
    id: Option<String>,
}

impl From<RawToolCall> for ToolCall {
    fn from(raw: RawToolCall) -> Self {
        let (arguments, rejected_arguments) = match raw.arguments {
            serde_json::Value::Null => (HashMap::new(), None),
            serde_json::Value::Object(map) => (map.into_iter().collect(), None),
            // Some models JSON-encode the arguments object
            serde_json::Value::String(text) => {
                match serde_json::from_str::<HashMap<String, serde_json::Value>>(&text) {
                    Ok(map) => (map, None),
                    Err(_) => (HashMap::new(), Some(serde_json::Value::String(text))),
                }
            }
            other => (HashMap::new(), Some(other)),
        };

        Self {
            name: raw.name,
            arguments,
            id: raw.id,
            rejected_arguments,
        }
    }
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: HashMap::new(),
            id: None,
            rejected_arguments: None,
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Fetch a string argument, treating blank strings as absent
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Capability-local failure classes. Always recoverable: the failure is
/// shown to the model as an observation and the loop continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolFailure {
    /// Missing or malformed arguments
    InvalidArguments,
    /// Requested tool is not in the catalog
    UnknownCapability,
    /// The service behind the tool failed
    UpstreamError,
}

impl std::fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolFailure::InvalidArguments => write!(f, "invalid-arguments"),
            ToolFailure::UnknownCapability => write!(f, "unknown-capability"),
            ToolFailure::UpstreamError => write!(f, "upstream-error"),
        }
    }
}

/// What a tool produced
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Observation {
        output: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },
    Failure {
        kind: ToolFailure,
        message: String,
    },
}

/// Result from tool execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            outcome: ToolOutcome::Observation {
                output: output.into(),
                data: None,
            },
        }
    }

    pub fn failure(name: impl Into<String>, kind: ToolFailure, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            outcome: ToolOutcome::Failure {
                kind,
                message: message.into(),
            },
        }
    }

    pub fn with_data(mut self, value: serde_json::Value) -> Self {
        if let ToolOutcome::Observation { data, .. } = &mut self.outcome {
            *data = Some(value);
        }
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Observation { .. })
    }

    pub fn failure_kind(&self) -> Option<ToolFailure> {
        match &self.outcome {
            ToolOutcome::Failure { kind, .. } => Some(*kind),
            ToolOutcome::Observation { .. } => None,
        }
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        match &self.outcome {
            ToolOutcome::Observation { data, .. } => data.as_ref(),
            ToolOutcome::Failure { .. } => None,
        }
    }

    /// Text shown to the model. Failures are folded in so it can react.
    pub fn observation(&self) -> String {
        match &self.outcome {
            ToolOutcome::Observation { output, .. } => {
                format!("[Tool '{}' returned]\n{}", self.name, output)
            }
            ToolOutcome::Failure { kind, message } => {
                format!("[Tool '{}' failed: {}]\n{}", self.name, kind, message)
            }
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, integer, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,

    /// String format; only `date` (YYYY-MM-DD) is enforced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ParameterSchema {
    pub fn required(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
            default: None,
            enum_values: None,
            format: None,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_enum(mut self, values: Vec<serde_json::Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn date(mut self) -> Self {
        self.format = Some("date".into());
        self
    }

    /// Check one supplied value; returns a problem description if it is malformed
    fn check(&self, value: &serde_json::Value) -> Option<String> {
        let type_ok = match self.param_type.as_str() {
            "string" => value.is_string(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            _ => true,
        };
        if !type_ok {
            return Some(format!("`{}` must be of type {}", self.name, self.param_type));
        }

        if let Some(allowed) = &self.enum_values {
            if !allowed.contains(value) {
                return Some(format!("`{}` must be one of {:?}", self.name, allowed));
            }
        }

        if self.format.as_deref() == Some("date") {
            let parsed = value
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok());
            if parsed.is_none() {
                return Some(format!("`{}` must be a date in YYYY-MM-DD format", self.name));
            }
        }

        None
    }
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,
}

impl ToolSchema {
    /// Validate arguments against the declared parameters.
    ///
    /// Problems are reported in parameter declaration order, so the same
    /// input always yields the same report.
    pub fn validate(
        &self,
        arguments: &HashMap<String, serde_json::Value>,
    ) -> std::result::Result<(), ValidationError> {
        let mut error = ValidationError {
            tool: self.name.clone(),
            fields: Vec::new(),
            problems: Vec::new(),
        };

        for param in &self.parameters {
            let value = arguments.get(&param.name).filter(|v| !v.is_null());
            let blank = value
                .and_then(|v| v.as_str())
                .is_some_and(|s| s.trim().is_empty());

            match value {
                None if param.required => {
                    error.fields.push(param.name.clone());
                    error.problems.push(format!("missing required field `{}`", param.name));
                }
                Some(_) if blank && param.required => {
                    error.fields.push(param.name.clone());
                    error.problems.push(format!("required field `{}` is empty", param.name));
                }
                Some(v) if !blank => {
                    if let Some(problem) = param.check(v) {
                        error.fields.push(param.name.clone());
                        error.problems.push(problem);
                    }
                }
                _ => {}
            }
        }

        if error.fields.is_empty() {
            Ok(())
        } else {
            Err(error)
        }
    }
}

/// Arguments rejected by schema validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub tool: String,
    /// Offending field names, in declaration order
    pub fields: Vec<String>,
    pub problems: Vec<String>,
}

impl ValidationError {
    pub fn new(tool: impl Into<String>, field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            fields: vec![field.into()],
            problems: vec![problem.into()],
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid arguments for '{}': {}",
            self.tool,
            self.problems.join("; ")
        )
    }
}

impl std::error::Error for ValidationError {}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with validated arguments.
    ///
    /// Implementations should turn upstream failures into
    /// [`ToolResult::failure`]; an `Err` here is still caught by the
    /// registry and reported as `upstream-error`.
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Validate arguments before execution
    fn validate(&self, call: &ToolCall) -> std::result::Result<(), ValidationError> {
        self.schema().validate(&call.arguments)
    }
}

struct RegisteredTool {
    schema: ToolSchema,
    tool: Arc<dyn Tool>,
}

/// Ordered registry of available tools, keyed by unique name.
///
/// The registry is mutable only while the agent is being built; the agent
/// holds it behind an `Arc` afterwards, which freezes the catalog.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
    timeout: Duration,
}

const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Deadline for one tool execution; expiry is reported as `upstream-error`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let schema = tool.schema();
        if self.index.contains_key(&schema.name) {
            return Err(AgentError::DuplicateTool(schema.name));
        }
        self.index.insert(schema.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool { schema, tool });
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| self.tools[i].tool.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Resolve, validate and execute one call. Never fails: every problem
    /// becomes a failure observation.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let result = match self.get(&call.name) {
            None => {
                tracing::warn!(tool = %call.name, "Model requested unknown tool");
                ToolResult::failure(
                    &call.name,
                    ToolFailure::UnknownCapability,
                    format!(
                        "No tool named '{}'. Available tools: {}",
                        call.name,
                        self.names().join(", ")
                    ),
                )
            }
            Some(tool) => {
                let checked = match &call.rejected_arguments {
                    Some(raw) => Err(ValidationError::new(
                        &call.name,
                        "arguments",
                        format!("`arguments` must be a JSON object, got {}", raw),
                    )),
                    None => tool.validate(call),
                };

                match checked {
                    Err(e) => {
                        tracing::debug!(tool = %call.name, fields = ?e.fields, "Tool arguments rejected");
                        ToolResult::failure(&call.name, ToolFailure::InvalidArguments, e.to_string())
                    }
                    Ok(()) => match tokio::time::timeout(self.timeout, tool.execute(call)).await {
                        Err(_) => {
                            tracing::warn!(tool = %call.name, timeout_secs = self.timeout.as_secs(), "Tool timed out");
                            ToolResult::failure(
                                &call.name,
                                ToolFailure::UpstreamError,
                                format!("'{}' did not finish within {}s", call.name, self.timeout.as_secs()),
                            )
                        }
                        Ok(Ok(result)) => result,
                        Ok(Err(AgentError::ToolValidation(msg))) => {
                            ToolResult::failure(&call.name, ToolFailure::InvalidArguments, msg)
                        }
                        Ok(Err(e)) => {
                            tracing::warn!(tool = %call.name, error = %e, "Tool execution failed");
                            ToolResult::failure(&call.name, ToolFailure::UpstreamError, e.to_string())
                        }
                    },
                }
            }
        };

        ToolResult {
            id: call.id.clone(),
            ..result
        }
    }

    /// Dispatch several calls. Results come back in request order even
    /// when executed concurrently.
    pub async fn dispatch_all(&self, calls: &[ToolCall], parallel: bool) -> Vec<ToolResult> {
        if parallel {
            join_all(calls.iter().map(|call| self.dispatch(call))).await
        } else {
            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                results.push(self.dispatch(call).await);
            }
            results
        }
    }

    /// All tool schemas in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema.clone()).collect()
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.schema.name.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Generate system prompt section describing available tools
    pub fn generate_prompt_section(&self) -> String {
        let mut prompt = String::from("## Available Tools\n\n");
        prompt.push_str("You can use the following tools by responding with a JSON block:\n\n");
        prompt.push_str("```tool\n{\"tool\": \"tool_name\", \"arguments\": {\"arg\": \"value\"}}\n```\n\n");
        prompt.push_str("To call several tools at once, put a JSON array of such objects in the block.\n");
        prompt.push_str("Only the tools listed here exist.\n\n");

        for entry in &self.tools {
            let schema = &entry.schema;
            prompt.push_str(&format!("### {}\n", schema.name));
            prompt.push_str(&format!("{}\n", schema.description));

            if !schema.parameters.is_empty() {
                prompt.push_str("**Parameters:**\n");
                for param in &schema.parameters {
                    let required = if param.required { " (required)" } else { "" };
                    let format = match param.format.as_deref() {
                        Some("date") => " [YYYY-MM-DD]",
                        _ => "",
                    };
                    prompt.push_str(&format!(
                        "- `{}` ({}){}{}: {}\n",
                        param.name, param.param_type, format, required, param.description
                    ));
                }
            }
            prompt.push('\n');
        }

        prompt
    }
}

// ============================================================================
// Built-in Tools
// ============================================================================

/// DateTime tool - returns the current date, optionally shifted by whole days
pub struct DateTimeTool;

#[async_trait]
impl Tool for DateTimeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "datetime".into(),
            description: "Get today's date and weekday (UTC). Use it to turn relative dates \
                          like 'tomorrow' or 'next Friday' into YYYY-MM-DD before searching."
                .into(),
            parameters: vec![
                ParameterSchema::optional("format", "string", "Output format: 'date', 'iso', or 'human'")
                    .with_default(serde_json::json!("human"))
                    .with_enum(vec![
                        serde_json::json!("date"),
                        serde_json::json!("iso"),
                        serde_json::json!("human"),
                    ]),
                ParameterSchema::optional(
                    "offset_days",
                    "integer",
                    "Days to add to today (negative for the past)",
                ),
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let format = call.str_arg("format").unwrap_or("human");
        let offset = call
            .arguments
            .get("offset_days")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        let shifted = chrono::Duration::try_days(offset)
            .and_then(|d| chrono::Utc::now().checked_add_signed(d))
            .ok_or_else(|| AgentError::ToolValidation(format!("offset_days {} is out of range", offset)))?;

        let output = match format {
            "date" => shifted.format("%Y-%m-%d").to_string(),
            "iso" => shifted.to_rfc3339(),
            _ => shifted.format("%A, %B %d, %Y (%Y-%m-%d) at %H:%M UTC").to_string(),
        };

        Ok(ToolResult::success("datetime", output))
    }
}

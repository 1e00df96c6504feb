//! Tool trait, registry, and executor.
//!
//! Tools are the side-effecting operations agents can ask the
//! reasoning backend to invoke mid-turn: create a task, save a
//! learning plan, list records. Arguments are validated against each
//! tool's declared schema before execution; caller identity travels in
//! [`InvocationMetadata`], never in the LLM-visible argument schema.

use crate::backend::ToolSpec;
use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// A request to execute a tool, as produced by the reasoning backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the backend's tool_call id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: Value,
}

/// The result of one tool execution. Failures are data, not errors:
/// one call's failure never aborts its siblings, and the error string
/// is folded back to the backend so it can apologize in natural
/// language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// Serialized payload on success, error string on failure
    pub output: String,
}

impl ToolResult {
    pub fn ok(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            success: true,
            output: output.into(),
        }
    }

    pub fn failed(call_id: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            call_id: call_id.into(),
            success: false,
            output: format!("Error: {error}"),
        }
    }
}

/// Caller identity for side effects — which caller's records to read
/// or mutate. Deliberately separate from the argument schema so the
/// backend cannot manipulate it.
#[derive(Debug, Clone, Default)]
pub struct InvocationMetadata {
    /// Stable caller identifier from the session collaborator.
    pub caller_id: String,

    /// Display name, when known.
    pub display_name: Option<String>,
}

impl InvocationMetadata {
    pub fn new(caller_id: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            display_name: None,
        }
    }
}

/// The core Tool trait.
///
/// Each tool implements this and is registered in the [`ToolRegistry`].
/// `execute` returns the serialized JSON payload handed back to the
/// reasoning backend.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "create_task").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the backend).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's arguments.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with validated arguments.
    async fn execute(&self, arguments: Value, meta: &InvocationMetadata)
    -> Result<String, ToolError>;

    /// Convert this tool into a spec for sending to the backend.
    fn to_spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools. Read-only after startup; safe for
/// concurrent reads.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// All tool specs (for sending to the backend).
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|t| t.to_spec()).collect()
    }

    /// Specs for a named subset, in the order given. Unknown names are
    /// skipped.
    pub fn specs_for(&self, names: &[&str]) -> Vec<ToolSpec> {
        names
            .iter()
            .filter_map(|n| self.tools.get(*n).map(|t| t.to_spec()))
            .collect()
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Execute a single call: look up the tool, validate arguments
    /// against its schema, run it.
    pub async fn execute(
        &self,
        call: &ToolCall,
        meta: &InvocationMetadata,
    ) -> Result<String, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;

        validate_arguments(&tool.parameters_schema(), &call.arguments)?;
        tool.execute(call.arguments.clone(), meta).await
    }

    /// Execute a batch of calls independently: one call's failure does
    /// not abort its siblings. Every input call yields exactly one
    /// result carrying its call id.
    pub async fn execute_batch(
        &self,
        calls: &[ToolCall],
        meta: &InvocationMetadata,
    ) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            match self.execute(call, meta).await {
                Ok(output) => results.push(ToolResult::ok(&call.id, output)),
                Err(e) => {
                    warn!(tool = %call.name, call_id = %call.id, error = %e, "Tool call failed");
                    results.push(ToolResult::failed(&call.id, e));
                }
            }
        }
        results
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a JSON argument object against a tool's declared schema.
///
/// Checks that the arguments form an object, that every `required`
/// property is present, and that declared property types match. Schema
/// features beyond that are accepted as-is.
pub fn validate_arguments(schema: &Value, arguments: &Value) -> Result<(), ToolError> {
    let Some(args) = arguments.as_object() else {
        return Err(ToolError::InvalidArguments(
            "arguments must be a JSON object".into(),
        ));
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(key) {
                return Err(ToolError::InvalidArguments(format!(
                    "missing required argument '{key}'"
                )));
            }
        }
    }

    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (key, value) in args {
            let Some(expected) = props.get(key).and_then(|p| p.get("type")).and_then(Value::as_str)
            else {
                continue;
            };
            let matches = match expected {
                "string" => value.is_string(),
                "number" => value.is_number(),
                "integer" => value.is_i64() || value.is_u64(),
                "boolean" => value.is_boolean(),
                "array" => value.is_array(),
                "object" => value.is_object(),
                _ => true,
            };
            if !matches {
                return Err(ToolError::InvalidArguments(format!(
                    "argument '{key}' must be of type {expected}"
                )));
            }
        }
    }

    Ok(())
}

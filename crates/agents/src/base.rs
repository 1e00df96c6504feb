//! The agent contract and the shared two-phase turn engine.
//!
//! A turn is at most two backend calls: the first proposes either a
//! final answer or a batch of tool calls; if tools were requested they
//! are all executed (failures isolated per call), the results are
//! folded back into the message sequence keyed by call id, and a
//! second call produces the final natural-language answer. The second
//! call is made without tool specs, so the exchange can never recurse.

use crate::instruction::build_instruction;
use async_trait::async_trait;
use std::sync::Arc;
use studymate_core::message::MessageToolCall;
use studymate_core::tool::{InvocationMetadata, ToolRegistry, ToolResult};
use studymate_core::{
    AgentId, AgentResponse, BackendReply, BackendRequest, ChatMessage, ReasoningBackend,
    RequestContext,
};
use tracing::{debug, warn};

/// Per-request input to an agent: conversation history, response
/// language, and the merged request context.
#[derive(Debug, Clone, Default)]
pub struct TurnContext {
    pub history: Vec<ChatMessage>,
    pub language: String,
    pub context: RequestContext,
}

impl TurnContext {
    pub fn new(history: Vec<ChatMessage>, language: impl Into<String>, context: RequestContext) -> Self {
        Self {
            history,
            language: language.into(),
            context,
        }
    }
}

/// The common agent contract.
///
/// `process` is infallible by design: agents catch everything and
/// degrade to a localized apology with `error: true`.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Which agent this is.
    fn id(&self) -> AgentId;

    /// Handle one user message.
    async fn process(&self, message: &str, ctx: &TurnContext) -> AgentResponse;
}

/// Run one agent turn through the two-phase protocol.
///
/// `tool_names` selects the subset of registered tools bound to the
/// first call; an empty slice means plain completion.
pub async fn run_turn(
    agent: AgentId,
    base_instruction: &str,
    tool_names: &[&str],
    backend: &Arc<dyn ReasoningBackend>,
    tools: &Arc<ToolRegistry>,
    message: &str,
    ctx: &TurnContext,
) -> AgentResponse {
    let instruction = build_instruction(base_instruction, &ctx.language, &ctx.context);

    let mut messages = Vec::with_capacity(ctx.history.len() + 2);
    messages.push(ChatMessage::system(instruction));
    messages.extend(ctx.history.iter().cloned());
    messages.push(ChatMessage::user(message));

    let bound_tools = tools.specs_for(tool_names);
    let request = BackendRequest::new(messages.clone()).with_tools(bound_tools);

    let reply = match backend.invoke(request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(agent = %agent, error = %e, "First backend call failed");
            return AgentResponse::degraded(agent, &ctx.language);
        }
    };

    match reply {
        BackendReply::Answer(content) => {
            if content.is_empty() {
                warn!(agent = %agent, "Backend returned empty content");
                return AgentResponse::degraded(agent, &ctx.language);
            }
            AgentResponse::ok(agent, content)
        }
        BackendReply::ToolCallsRequested {
            assistant_content,
            calls,
        } => {
            debug!(agent = %agent, tool_calls = calls.len(), "Executing requested tools");

            let meta = invocation_metadata(&ctx.context);
            let results = tools.execute_batch(&calls, &meta).await;

            // Fold the tool-call-bearing assistant message plus one
            // result per call id back into the sequence.
            let call_refs: Vec<MessageToolCall> = calls
                .iter()
                .map(|c| MessageToolCall {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    arguments: c.arguments.to_string(),
                })
                .collect();
            messages.push(ChatMessage::assistant_with_calls(assistant_content, call_refs));
            for result in &results {
                messages.push(ChatMessage::tool_result(&result.call_id, &result.output));
            }

            let tool_names_used: Vec<&str> =
                calls.iter().map(|c| c.name.as_str()).collect();

            let second = BackendRequest::new(messages);
            let content = match backend.invoke(second).await {
                Ok(reply) => match reply {
                    BackendReply::Answer(text) => text,
                    BackendReply::ToolCallsRequested { .. } => {
                        warn!(agent = %agent, "Backend requested tools on the second phase");
                        String::new()
                    }
                },
                Err(e) => {
                    warn!(agent = %agent, error = %e, "Second backend call failed");
                    String::new()
                }
            };

            let content = if content.is_empty() {
                summarize_tool_results(&results, &ctx.language)
            } else {
                content
            };

            if content.is_empty() {
                return AgentResponse::degraded(agent, &ctx.language);
            }

            AgentResponse::ok(agent, content)
                .with_metadata("toolsUsed", serde_json::json!(tool_names_used))
        }
    }
}

/// Build the tool invocation metadata from the request context.
fn invocation_metadata(context: &RequestContext) -> InvocationMetadata {
    InvocationMetadata {
        caller_id: context.caller_id().unwrap_or_default().to_string(),
        display_name: context.user_name().map(String::from),
    }
}

/// Fallback answer synthesized from successful tool results when the
/// second phase produced no content. Empty when nothing succeeded,
/// which lets the caller degrade.
fn summarize_tool_results(results: &[ToolResult], language: &str) -> String {
    let succeeded: Vec<&ToolResult> = results.iter().filter(|r| r.success).collect();
    if succeeded.is_empty() {
        return String::new();
    }

    let header = match language {
        "es" => format!("Listo, completé {} acción(es):", succeeded.len()),
        _ => format!("Done — I completed {} action(s):", succeeded.len()),
    };

    let mut summary = header;
    for result in succeeded {
        let mut line = result.output.clone();
        if line.len() > 200 {
            // Truncation must land on a char boundary; payloads carry
            // accented text.
            let mut cut = 200;
            while !line.is_char_boundary(cut) {
                cut -= 1;
            }
            line.truncate(cut);
            line.push('…');
        }
        summary.push_str("\n- ");
        summary.push_str(&line);
    }
    summary
}

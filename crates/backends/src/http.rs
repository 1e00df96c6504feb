//! OpenAI-compatible backend implementation.
//!
//! Works with OpenAI, OpenRouter, Ollama, vLLM, and any other service
//! exposing a `/chat/completions` endpoint. Supports plain completions
//! and the tool-calling sub-protocol; the reply is surfaced as the
//! tagged [`BackendReply`] variant so the two-phase exchange is an
//! explicit branch for callers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use studymate_core::error::BackendError;
use studymate_core::message::{ChatMessage, Role};
use studymate_core::tool::ToolCall;
use studymate_core::{BackendReply, BackendRequest, ReasoningBackend, ToolSpec};
use tracing::{debug, warn};

/// An OpenAI-compatible reasoning backend.
pub struct HttpBackend {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a new backend bound to one model configuration.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            max_tokens,
            timeout,
            client,
        }
    }

    /// The model this backend is bound to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert our message types to the wire format.
    fn to_api_messages(messages: &[ChatMessage]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                    Role::System => "system".into(),
                    Role::Tool => "tool".into(),
                },
                content: Some(m.content.clone()),
                tool_calls: if m.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        m.tool_calls
                            .iter()
                            .map(|tc| ApiToolCall {
                                id: tc.id.clone(),
                                r#type: "function".into(),
                                function: ApiFunctionCall {
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                },
                tool_call_id: m.tool_call_id.clone(),
            })
            .collect()
    }

    /// Convert tool specs to the wire format.
    fn to_api_tools(tools: &[ToolSpec]) -> Vec<ApiToolSpec> {
        tools
            .iter()
            .map(|t| ApiToolSpec {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }
}

#[async_trait]
impl ReasoningBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: BackendRequest) -> Result<BackendReply, BackendError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        debug!(backend = %self.name, model = %self.model, messages = request.messages.len(), "Sending completion request");

        // reqwest enforces the client timeout; wrap anyway so a stalled
        // connect/read surfaces as our Timeout variant.
        let send = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send();

        let response = match tokio::time::timeout(self.timeout, send).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if e.is_timeout() => {
                return Err(BackendError::Timeout(format!(
                    "Backend '{}' timed out after {}s",
                    self.name,
                    self.timeout.as_secs()
                )));
            }
            Ok(Err(e)) => return Err(BackendError::Network(e.to_string())),
            Err(_) => {
                return Err(BackendError::Timeout(format!(
                    "Backend '{}' timed out after {}s",
                    self.name,
                    self.timeout.as_secs()
                )));
            }
        };

        let status = response.status().as_u16();

        if status == 429 {
            return Err(BackendError::RateLimited { retry_after_secs: 5 });
        }

        if status == 401 || status == 403 {
            return Err(BackendError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Backend returned error");
            return Err(BackendError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| BackendError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        let content = choice.message.content.unwrap_or_default();
        let raw_calls = choice.message.tool_calls.unwrap_or_default();

        if raw_calls.is_empty() {
            return Ok(BackendReply::Answer(content));
        }

        let calls = raw_calls
            .into_iter()
            .map(|tc| ToolCall {
                id: if tc.id.is_empty() {
                    uuid::Uuid::new_v4().to_string()
                } else {
                    tc.id
                },
                name: tc.function.name,
                // Malformed argument JSON becomes an empty object; the
                // registry's schema validation reports the real problem.
                arguments: serde_json::from_str(&tc.function.arguments)
                    .unwrap_or_else(|_| serde_json::json!({})),
            })
            .collect();

        Ok(BackendReply::ToolCallsRequested {
            assistant_content: content,
            calls,
        })
    }

    async fn health_check(&self) -> Result<bool, BackendError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// ── Wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    #[serde(default)]
    id: String,
    r#type: String,
    function: ApiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ApiToolSpec {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

//! OpenAI-compatible chat-completions backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use surgeplan_ai::{AiError, GenerateRequest, LanguageModel, ResponseFormat};

/// Calls `POST {base_url}/chat/completions` with a bearer key.
///
/// `model_ref` is sent as the model name. Requests in [`ResponseFormat::Json`]
/// ask for a JSON object response.
#[derive(Clone)]
pub struct OpenAiChatModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiChatModel {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl core::fmt::Debug for OpenAiChatModel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpenAiChatModel")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<JsonMode>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonMode {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

fn chat_request(request: &GenerateRequest) -> ChatRequest<'_> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.prompt,
    });

    ChatRequest {
        model: &request.model_ref,
        messages,
        temperature: 0.2,
        response_format: match request.format {
            ResponseFormat::Json => Some(JsonMode { kind: "json_object" }),
            ResponseFormat::Text => None,
        },
    }
}

/// First choice's message content.
fn reply_text(body: &str) -> Result<String, AiError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| AiError::InvalidOutput(format!("malformed completion: {e}")))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AiError::InvalidOutput("completion has no content".to_string()))
}

/// Rate limits and server errors are worth retrying; other statuses are not.
fn status_error(status: reqwest::StatusCode, body: &str) -> AiError {
    let snippet: String = body.chars().take(200).collect();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        AiError::Unavailable(format!("backend returned {status}: {snippet}"))
    } else {
        AiError::InvalidRequest(format!("backend returned {status}: {snippet}"))
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .timeout(request.timeout)
            .json(&chat_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout(request.timeout)
                } else {
                    AiError::Unavailable(e.to_string())
                }
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                AiError::Timeout(request.timeout)
            } else {
                AiError::Unavailable(e.to_string())
            }
        })?;

        if !status.is_success() {
            warn!(model_ref = %request.model_ref, %status, "chat completion failed");
            return Err(status_error(status, &body));
        }

        let text = reply_text(&body)?;
        debug!(model_ref = %request.model_ref, chars = text.len(), "chat completion received");
        Ok(text)
    }
}

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::provider::{ChatRequest, ChatResponse, LlmProvider, ProviderError};

/// OpenAI chat completions (and any endpoint speaking the same wire format).
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build HTTP client with timeout, using defaults");
                reqwest::Client::new()
            });
        Self {
            client,
            api_key,
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(model = %req.model, max_tokens = req.max_tokens, "requesting completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&build_request_body(req))
            .send()
            .await?;

        parse_response(decode(resp).await?)
    }
}

/// Fallback wait when a 429 carries no usable `retry-after`.
const DEFAULT_RETRY_AFTER_MS: u64 = 5_000;

async fn decode(resp: reqwest::Response) -> Result<ApiResponse, ProviderError> {
    let status = resp.status().as_u16();
    match status {
        200..=299 => resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string())),
        429 => {
            let retry_after_ms = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map_or(DEFAULT_RETRY_AFTER_MS, |secs| secs * 1000);
            Err(ProviderError::RateLimited { retry_after_ms })
        }
        _ => {
            let message = resp.text().await.unwrap_or_default();
            warn!(status, body = %message, "completion request rejected");
            Err(ProviderError::Api { status, message })
        }
    }
}

fn build_request_body(req: &ChatRequest) -> serde_json::Value {
    let mut messages = vec![serde_json::json!({
        "role": "system",
        "content": req.system,
    })];

    for m in &req.messages {
        messages.push(serde_json::json!({
            "role": m.role,
            "content": m.content,
        }));
    }

    serde_json::json!({
        "model": req.model,
        "messages": messages,
        "max_tokens": req.max_tokens,
        "temperature": req.temperature,
    })
}

fn parse_response(resp: ApiResponse) -> Result<ChatResponse, ProviderError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("response has no choices".to_string()))?;

    let content = choice
        .message
        .content
        .ok_or_else(|| ProviderError::Parse("choice has no message content".to_string()))?;

    Ok(ChatResponse {
        content,
        model: resp.model,
        tokens_in: resp.usage.as_ref().map(|u| u.prompt_tokens).unwrap_or(0),
        tokens_out: resp
            .usage
            .as_ref()
            .map(|u| u.completion_tokens)
            .unwrap_or(0),
        stop_reason: choice.finish_reason.unwrap_or_default(),
    })
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

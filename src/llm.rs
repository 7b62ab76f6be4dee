use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};

/// One text-generation call: a system instruction, a user message and the
/// sampling temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
}

pub trait TextGenerator {
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String>;
}

/// Client for OpenAI-compatible `/chat/completions` endpoints (Groq by default).
pub struct ChatCompletionsClient {
    client: HttpClient,
    api_base: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ChatCompletionsClient {
    pub fn new(api_base: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("failed to build model http client")?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl TextGenerator for ChatCompletionsClient {
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = ChatRequest {
            model: request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .with_context(|| format!("failed to reach {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .map(|value| value.error.message)
                .unwrap_or_else(|_| "unknown error".to_string());
            bail!("chat completion failed ({status}): {message}");
        }

        let parsed: ChatResponse = response
            .json()
            .context("failed to parse chat completion response")?;
        first_choice_text(parsed)
    }
}

fn first_choice_text(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .context("chat completion returned no choices")
        .map(|choice| choice.message.content.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn chat_request_serializes_system_then_user() {
        let body = ChatRequest {
            model: "m",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "rules",
                },
                ChatMessage {
                    role: "user",
                    content: "chunk",
                },
            ],
            temperature: 0.0,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "m",
                "messages": [
                    {"role": "system", "content": "rules"},
                    {"role": "user", "content": "chunk"}
                ],
                "temperature": 0.0
            })
        );
    }

    #[test]
    fn first_choice_text_handles_null_content_and_empty_choices() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert_eq!(first_choice_text(response).unwrap(), "");

        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(first_choice_text(response).is_err());
    }
}

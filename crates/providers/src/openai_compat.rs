//! OpenAI-compatible streaming client.
//!
//! Works with any endpoint exposing `/v1/chat/completions` with SSE
//! streaming: OpenAI, OpenRouter, Ollama, vLLM, and friends.
//!
//! The tag protocol lives entirely in the model's text output, so this
//! client deliberately ignores the function-calling surface of the API:
//! it forwards raw content deltas as fragments and lets the classifier
//! downstream decide what they mean.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use tagflow_core::error::LlmError;
use tagflow_core::llm::LlmClient;
use tagflow_core::turn::{Role, Turn};

/// An OpenAI-compatible LLM client streaming raw text fragments.
pub struct OpenAiCompatClient {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| LlmError::NotConfigured(format!("http client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            client,
        })
    }

    /// OpenRouter convenience constructor.
    pub fn openrouter(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key, model)
    }

    /// Ollama convenience constructor; no real key needed.
    pub fn ollama(base_url: Option<&str>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama",
            model,
        )
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    fn to_api_messages(turns: &[Turn]) -> Vec<ApiMessage> {
        turns
            .iter()
            .map(|t| ApiMessage {
                role: match t.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::System => "system",
                    // Consolidated tool results are ordinary user-visible
                    // context in this protocol, not API-level tool turns.
                    Role::Tool => "user",
                }
                .to_string(),
                content: t.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream_completion(
        &self,
        turns: &[Turn],
    ) -> Result<mpsc::Receiver<Result<String, LlmError>>, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": Self::to_api_messages(turns),
            "temperature": self.temperature,
            "stream": true,
        });
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(client = %self.name, model = %self.model, turns = turns.len(), "sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(LlmError::RateLimited { retry_after_secs: 5 });
        }
        if status == 401 || status == 403 {
            return Err(LlmError::AuthenticationFailed(
                "invalid API key or insufficient permissions".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "provider returned error");
            return Err(LlmError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let (tx, rx) = mpsc::channel(64);
        let client_name = self.name.clone();

        // Reader task: line-buffer the SSE byte stream and forward
        // content deltas as fragments.
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx.send(Err(LlmError::StreamInterrupted(e.to_string()))).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim_end_matches('\r').to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }
                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    let data = data.trim();
                    if data == "[DONE]" {
                        return;
                    }

                    match serde_json::from_str::<StreamResponse>(data) {
                        Ok(parsed) => {
                            let Some(choice) = parsed.choices.first() else {
                                continue;
                            };
                            if let Some(content) = &choice.delta.content {
                                if !content.is_empty()
                                    && tx.send(Ok(content.clone())).await.is_err()
                                {
                                    return; // receiver dropped
                                }
                            }
                            if choice.finish_reason.is_some() {
                                return;
                            }
                        }
                        Err(e) => {
                            trace!(client = %client_name, data = %data, error = %e,
                                "ignoring unparseable SSE chunk");
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}

// --- SSE wire types ---

#[derive(Debug, serde::Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

/// One SSE `data: {...}` chunk.
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openrouter_constructor() {
        let client = OpenAiCompatClient::openrouter("sk-test", "gpt-4o").unwrap();
        assert_eq!(client.name(), "openrouter");
        assert!(client.base_url.contains("openrouter.ai"));
    }

    #[test]
    fn ollama_constructor() {
        let client = OpenAiCompatClient::ollama(None, "llama3").unwrap();
        assert_eq!(client.name(), "ollama");
        assert!(client.base_url.contains("localhost:11434"));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let client =
            OpenAiCompatClient::new("x", "https://api.example.com/v1/", "k", "m").unwrap();
        assert_eq!(client.base_url, "https://api.example.com/v1");
    }

    #[test]
    fn turn_conversion_roles() {
        let turns = vec![
            Turn::system("be terse"),
            Turn::user("hello"),
            Turn::assistant("<thinking>hi</thinking>"),
            Turn::tool_results("Tool results (1 executed, 1 succeeded, 0 failed)"),
        ];
        let messages = OpenAiCompatClient::to_api_messages(&turns);
        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert!(messages[2].content.contains("<thinking>"));
    }

    #[test]
    fn parse_content_delta() {
        let data = r#"{"choices":[{"delta":{"content":"<thi"},"finish_reason":null}]}"#;
        let parsed: StreamResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.choices[0].delta.content.as_deref(), Some("<thi"));
    }

    #[test]
    fn parse_finish_chunk() {
        let data = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        let parsed: StreamResponse = serde_json::from_str(data).unwrap();
        assert!(parsed.choices[0].delta.content.is_none());
        assert_eq!(parsed.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn parse_empty_choices() {
        let parsed: StreamResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }
}

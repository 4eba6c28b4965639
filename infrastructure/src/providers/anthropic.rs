//! Anthropic-compatible Messages API client
//!
//! Streams `POST {base_url}/v1/messages` over server-sent events. The same
//! client serves every provider that speaks this API (Anthropic, Z.ai,
//! MiniMax) and differs only in base URL and key.

use super::catalog::{ModelSettings, ProviderSettings};
use super::{ProviderClient, STREAM_BUFFER};
use async_trait::async_trait;
use futures::StreamExt;
use planner_application::ports::llm_gateway::{ChatRequest, GatewayError, StreamHandle};
use planner_domain::StreamEvent;
use reqwest::Client;
use reqwest_eventsource::{Event, EventSource};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const FALLBACK_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// What one SSE payload means for the reply
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    Text(String),
    Stop,
    Error(String),
    Ignore,
}

fn parse_frame(data: &str) -> Frame {
    let value: Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(e) => return Frame::Error(format!("invalid event payload: {}", e)),
    };

    match value["type"].as_str() {
        Some("content_block_delta") if value["delta"]["type"] == "text_delta" => {
            Frame::Text(value["delta"]["text"].as_str().unwrap_or_default().to_string())
        }
        Some("message_stop") => Frame::Stop,
        Some("error") => Frame::Error(
            value["error"]["message"]
                .as_str()
                .unwrap_or("unknown API error")
                .to_string(),
        ),
        _ => Frame::Ignore,
    }
}

pub struct AnthropicClient {
    http: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
}

impl AnthropicClient {
    /// Build a client for a configured API provider. Fails when neither the
    /// provider's key variable nor `ANTHROPIC_API_KEY` is set.
    pub fn new(provider: &str, settings: &ProviderSettings) -> Result<Self, GatewayError> {
        let key_env = settings.api_key_env.as_deref().unwrap_or(FALLBACK_KEY_ENV);
        let api_key = std::env::var(key_env)
            .or_else(|_| std::env::var(FALLBACK_KEY_ENV))
            .map_err(|_| GatewayError::MissingApiKey {
                provider: provider.to_string(),
                env_var: key_env.to_string(),
            })?;

        let base_url = settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            http: Client::new(),
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
            api_key,
            api_version: settings.api_version.clone(),
        })
    }

    fn request_body(model: &ModelSettings, request: &ChatRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
            .collect();

        json!({
            "model": model.id,
            "max_tokens": model.max_tokens,
            "system": request.system_prompt,
            "messages": messages,
            "stream": true,
        })
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    async fn stream(
        &self,
        model: &ModelSettings,
        request: ChatRequest,
    ) -> Result<StreamHandle, GatewayError> {
        let builder = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(&Self::request_body(model, &request));

        let mut es =
            EventSource::new(builder).map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        debug!("Streaming {} from {}", model.id, self.endpoint);

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        tokio::spawn(async move {
            let mut full_text = String::new();
            while let Some(event) = es.next().await {
                let terminal = match event {
                    Ok(Event::Open) => continue,
                    Ok(Event::Message(msg)) => match parse_frame(&msg.data) {
                        Frame::Text(text) => {
                            full_text.push_str(&text);
                            if tx.send(StreamEvent::Delta(text)).await.is_err() {
                                debug!("Stream receiver dropped");
                                break;
                            }
                            continue;
                        }
                        Frame::Ignore => continue,
                        Frame::Stop => StreamEvent::Completed(std::mem::take(&mut full_text)),
                        Frame::Error(e) => StreamEvent::Error(e),
                    },
                    Err(e) => {
                        warn!("Event stream error: {}", e);
                        StreamEvent::Error(e.to_string())
                    }
                };
                let _ = tx.send(terminal).await;
                break;
            }
            es.close();
        });

        Ok(StreamHandle::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_domain::Message;

    #[test]
    fn test_text_delta() {
        let frame = parse_frame(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"```yaml"}}"#,
        );
        assert_eq!(frame, Frame::Text("```yaml".to_string()));
    }

    #[test]
    fn test_control_frames() {
        assert_eq!(parse_frame(r#"{"type":"message_stop"}"#), Frame::Stop);
        assert_eq!(parse_frame(r#"{"type":"ping"}"#), Frame::Ignore);
        assert_eq!(
            parse_frame(r#"{"type":"content_block_delta","delta":{"type":"input_json_delta","partial_json":"{"}}"#),
            Frame::Ignore
        );
        assert_eq!(
            parse_frame(r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#),
            Frame::Error("Overloaded".to_string())
        );
        assert!(matches!(parse_frame("not json"), Frame::Error(_)));
    }

    #[test]
    fn test_request_body() {
        let model = ModelSettings {
            id: "glm-4.7".to_string(),
            provider: "zai".to_string(),
            max_tokens: 16384,
        };
        let request = ChatRequest {
            model: "glm-4.7".to_string(),
            system_prompt: "You are acting as Layer Planner".to_string(),
            messages: vec![Message::user("Plan layer-01")],
        };

        let body = AnthropicClient::request_body(&model, &request);
        assert_eq!(body["model"], "glm-4.7");
        assert_eq!(body["max_tokens"], 16384);
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["system"], "You are acting as Layer Planner");
    }
}

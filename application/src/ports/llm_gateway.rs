//! LLM Gateway port
//!
//! Defines the interface for streaming chat with LLM providers.

use async_trait::async_trait;
use planner_domain::{Message, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Missing API key for {provider}: set {env_var}")]
    MissingApiKey { provider: String, env_var: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("Other error: {0}")]
    Other(String),
}

/// One chat request: a model key, a system prompt and the ordered messages.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Configured model key (e.g. `sonnet`, `claude`) or a raw model id
    pub model: String,
    pub system_prompt: String,
    pub messages: Vec<Message>,
}

/// Gateway for LLM communication
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Start a streaming chat. Text arrives as [`StreamEvent`]s on the
    /// returned handle. A stream that ends without `Completed` or `Error`
    /// is a failed request.
    async fn stream_chat(&self, request: ChatRequest) -> Result<StreamHandle, GatewayError>;
}

/// Handle for receiving streaming events from an LLM request.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience methods
/// for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        Err(GatewayError::RequestFailed(
            "stream ended before completion".to_string(),
        ))
    }
}

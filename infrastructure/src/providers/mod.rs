//! LLM providers
//!
//! A model key (`sonnet`, `glm-4.7`, `claude`) resolves through the
//! [`ModelCatalog`] to a model id and a provider name. The [`ProviderPool`]
//! builds one [`ProviderClient`] per provider on first use, and the
//! [`RoutingLlmGateway`] ties both together behind the
//! [`LlmGateway`](planner_application::ports::llm_gateway::LlmGateway) port.

pub mod anthropic;
pub mod catalog;
pub mod claude_cli;
pub mod pool;
pub mod routing;

pub use anthropic::AnthropicClient;
pub use catalog::{ModelCatalog, ModelSettings, ProviderKind, ProviderSettings};
pub use claude_cli::ClaudeCliClient;
pub use pool::ProviderPool;
pub use routing::RoutingLlmGateway;

use async_trait::async_trait;
use planner_application::ports::llm_gateway::{ChatRequest, GatewayError, StreamHandle};

/// Buffered stream events per request
pub(crate) const STREAM_BUFFER: usize = 64;

/// One connection to an LLM provider.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Start streaming a reply from `model`.
    ///
    /// Dropping the returned handle stops the stream.
    async fn stream(
        &self,
        model: &ModelSettings,
        request: ChatRequest,
    ) -> Result<StreamHandle, GatewayError>;
}

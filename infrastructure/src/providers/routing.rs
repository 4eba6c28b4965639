use super::ProviderPool;
use async_trait::async_trait;
use planner_application::ports::llm_gateway::{ChatRequest, GatewayError, LlmGateway, StreamHandle};
use std::sync::Arc;
use tracing::debug;

/// [`LlmGateway`] that routes each request to the provider of its model.
///
/// Resolution order:
///  1. the model key's `[models.<key>]` entry (config or built-in)
///  2. otherwise the key is used verbatim as a model id on `anthropic`
pub struct RoutingLlmGateway {
    pool: Arc<ProviderPool>,
}

impl RoutingLlmGateway {
    pub fn new(pool: Arc<ProviderPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<ProviderPool> {
        &self.pool
    }
}

#[async_trait]
impl LlmGateway for RoutingLlmGateway {
    async fn stream_chat(&self, request: ChatRequest) -> Result<StreamHandle, GatewayError> {
        let model = self.pool.catalog().resolve(&request.model);
        debug!(
            "Routing {} to {} ({})",
            request.model, model.provider, model.id
        );
        let client = self.pool.client(&model.provider).await?;
        client.stream(&model, request).await
    }
}

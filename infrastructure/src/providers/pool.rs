//! Lazily built provider clients, one per provider name.

use super::catalog::{ModelCatalog, ProviderKind};
use super::{AnthropicClient, ClaudeCliClient, ProviderClient};
use planner_application::ports::llm_gateway::GatewayError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub struct ProviderPool {
    catalog: ModelCatalog,
    clients: Mutex<HashMap<String, Arc<dyn ProviderClient>>>,
}

impl ProviderPool {
    pub fn new(catalog: ModelCatalog) -> Self {
        Self {
            catalog,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Register a ready-made client under a provider name.
    pub async fn insert(&self, provider: impl Into<String>, client: Arc<dyn ProviderClient>) {
        self.clients.lock().await.insert(provider.into(), client);
    }

    /// Client for `provider`, built on first use.
    pub async fn client(&self, provider: &str) -> Result<Arc<dyn ProviderClient>, GatewayError> {
        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get(provider) {
            return Ok(Arc::clone(client));
        }

        let settings = self
            .catalog
            .provider(provider)
            .ok_or_else(|| GatewayError::UnknownProvider(provider.to_string()))?;
        let client: Arc<dyn ProviderClient> = match settings.kind {
            ProviderKind::Api => Arc::new(AnthropicClient::new(provider, settings)?),
            ProviderKind::ClaudeCli => Arc::new(ClaudeCliClient::new(settings)),
        };
        debug!("Created {:?} client for provider {}", settings.kind, provider);

        clients.insert(provider.to_string(), Arc::clone(&client));
        Ok(client)
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }
}

//! Application layer for layered-planner
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod error;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::PlannerConfig;
pub use error::PlannerError;
pub use ports::{
    artifact_store::{ArtifactStore, StoreError},
    codebase_scanner::{CodebaseScanner, ScanError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    docs_fetcher::{DocsFetcher, Registry},
    llm_gateway::{ChatRequest, GatewayError, LlmGateway, StreamHandle},
    product_source::ProductSource,
    progress::{ChannelProgress, NoProgress, PlanningProgress},
};
pub use use_cases::checkpoints::CheckpointManager;
pub use use_cases::context_builder::{ArtifactsSummary, ContextBuilder};
pub use use_cases::orchestrator::{
    GroupInfo, LayerInfo, NextAction, PlannerOrchestrator, PlanningStatus,
};
pub use use_cases::phases::{PhaseOutput, PhaseResult};
pub use use_cases::repository::PlanningRepository;

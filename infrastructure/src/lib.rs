//! Infrastructure layer for layered-planner
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod analysis;
pub mod config;
pub mod docs;
pub mod logging;
pub mod providers;
pub mod store;

// Re-export commonly used types
pub use analysis::CodebaseAnalyzer;
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileDocsConfig, FileLoggingConfig,
    FilePlannerConfig,
};
pub use docs::{DocsSettings, RegistryDocsFetcher};
pub use logging::JsonlConversationLogger;
pub use providers::{
    AnthropicClient, ClaudeCliClient, ModelCatalog, ModelSettings, ProviderClient, ProviderKind,
    ProviderPool, ProviderSettings, RoutingLlmGateway,
};
pub use store::{FsArtifactStore, MarkdownProductSource};

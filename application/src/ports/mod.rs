//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod artifact_store;
pub mod codebase_scanner;
pub mod conversation_logger;
pub mod docs_fetcher;
pub mod llm_gateway;
pub mod product_source;
pub mod progress;

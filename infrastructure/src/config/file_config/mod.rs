//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! `[providers.*]` and `[models.*]` entries use the provider catalog types
//! directly and extend the built-in tables.

mod docs;
mod planner;

pub use docs::{FileDocsConfig, FileLoggingConfig};
pub use planner::FilePlannerConfig;

use crate::docs::DocsSettings;
use crate::providers::{ModelCatalog, ModelSettings, ProviderSettings};
use planner_application::PlannerConfig;
use planner_application::ports::docs_fetcher::Registry;
use planner_domain::ParseThresholds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("planner.model cannot be empty")]
    EmptyModelName,

    #[error("planner.{field} must be at least 1")]
    InvalidThreshold { field: &'static str },

    #[error("planner.default_registry: {0}")]
    InvalidRegistry(String),

    #[error("model '{model}' uses unknown provider '{provider}'")]
    UnknownProvider { model: String, provider: String },

    #[error("docs.timeout_seconds cannot be 0")]
    InvalidTimeout,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub planner: FilePlannerConfig,
    /// Extra or replacement providers, by name
    pub providers: BTreeMap<String, ProviderSettings>,
    /// Extra or replacement model keys
    pub models: BTreeMap<String, ModelSettings>,
    pub docs: FileDocsConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Built-in providers and models with this file's entries applied.
    pub fn catalog(&self) -> ModelCatalog {
        ModelCatalog::with_overrides(&self.providers, &self.models)
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.planner.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if self.planner.min_groups == 0 {
            return Err(ConfigValidationError::InvalidThreshold { field: "min_groups" });
        }
        if self.planner.min_tasks == 0 {
            return Err(ConfigValidationError::InvalidThreshold { field: "min_tasks" });
        }
        self.registry()?;
        if self.docs.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        let catalog = self.catalog();
        for (key, model) in catalog.models() {
            if !catalog.has_provider(&model.provider) {
                return Err(ConfigValidationError::UnknownProvider {
                    model: key.to_string(),
                    provider: model.provider.clone(),
                });
            }
        }
        Ok(())
    }

    fn registry(&self) -> Result<Registry, ConfigValidationError> {
        self.planner
            .default_registry
            .parse()
            .map_err(ConfigValidationError::InvalidRegistry)
    }

    /// Use case parameters. Call after [`validate`](Self::validate); an
    /// invalid registry falls back to npm.
    pub fn to_planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            model: self.planner.model.clone(),
            fetch_docs: self.planner.fetch_docs,
            default_registry: self.registry().unwrap_or_default(),
            thresholds: ParseThresholds {
                min_groups: self.planner.min_groups,
                min_tasks: self.planner.min_tasks,
            },
            prompts_dir: self.planner.prompts_dir.clone(),
            personas_dir: self.planner.personas_dir.clone(),
        }
    }

    pub fn docs_settings(&self) -> DocsSettings {
        DocsSettings {
            timeout: Duration::from_secs(self.docs.timeout_seconds),
            summary_chars: self.docs.summary_chars,
            section_chars: self.docs.section_chars,
            default_registry: self.registry().unwrap_or_default(),
        }
    }
}

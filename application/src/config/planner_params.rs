//! Planner parameters — use case policy knobs.
//!
//! [`PlannerConfig`] groups the values the orchestrator and phases need at
//! run time. The infrastructure config loader builds one from `[planner]`.

use crate::ports::docs_fetcher::Registry;
use planner_domain::ParseThresholds;

pub const DEFAULT_MODEL: &str = "claude";
pub const DEFAULT_PROMPTS_DIR: &str = "tooling/prompts/planner";
pub const DEFAULT_PERSONAS_DIR: &str = "design/personas";

/// Orchestrator and phase parameters.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Model key passed to the gateway for every phase.
    pub model: String,
    /// Fetch documentation for the chosen stack after the architect phase.
    pub fetch_docs: bool,
    /// Registry for names that do not look like npm packages.
    pub default_registry: Registry,
    pub thresholds: ParseThresholds,
    /// Directory of project prompt templates, relative to the project root.
    pub prompts_dir: String,
    /// Directory of project persona overrides, relative to the project root.
    pub personas_dir: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            fetch_docs: true,
            default_registry: Registry::Npm,
            thresholds: ParseThresholds::default(),
            prompts_dir: DEFAULT_PROMPTS_DIR.to_string(),
            personas_dir: DEFAULT_PERSONAS_DIR.to_string(),
        }
    }
}

impl PlannerConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_fetch_docs(mut self, fetch_docs: bool) -> Self {
        self.fetch_docs = fetch_docs;
        self
    }

    pub fn with_thresholds(mut self, thresholds: ParseThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = PlannerConfig::default();
        assert_eq!(config.model, "claude");
        assert!(config.fetch_docs);
        assert_eq!(config.default_registry, Registry::Npm);
        assert_eq!(config.thresholds.min_groups, 1);
        assert_eq!(config.prompts_dir, "tooling/prompts/planner");
    }

    #[test]
    fn test_builder() {
        let config = PlannerConfig::default()
            .with_model("sonnet")
            .with_fetch_docs(false)
            .with_thresholds(ParseThresholds {
                min_groups: 2,
                min_tasks: 3,
            });
        assert_eq!(config.model, "sonnet");
        assert!(!config.fetch_docs);
        assert_eq!(config.thresholds.min_tasks, 3);
    }
}

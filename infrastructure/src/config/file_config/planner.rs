//! `[planner]` section

use planner_application::config::planner_params::{
    DEFAULT_MODEL, DEFAULT_PERSONAS_DIR, DEFAULT_PROMPTS_DIR,
};
use serde::{Deserialize, Serialize};

/// Planning workflow settings
///
/// # Example
///
/// ```toml
/// [planner]
/// model = "sonnet"
/// fetch_docs = false
/// default_registry = "pypi"
/// min_groups = 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePlannerConfig {
    /// Model key used for every phase
    pub model: String,
    /// Fetch stack documentation after the architect phase
    pub fetch_docs: bool,
    /// `npm` or `pypi`
    pub default_registry: String,
    /// Fewest groups a layer plan may contain
    pub min_groups: usize,
    /// Fewest tasks a group plan may contain
    pub min_tasks: usize,
    pub prompts_dir: String,
    pub personas_dir: String,
}

impl Default for FilePlannerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            fetch_docs: true,
            default_registry: "npm".to_string(),
            min_groups: 1,
            min_tasks: 1,
            prompts_dir: DEFAULT_PROMPTS_DIR.to_string(),
            personas_dir: DEFAULT_PERSONAS_DIR.to_string(),
        }
    }
}

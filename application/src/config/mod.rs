//! Application-level configuration.
//!
//! - [`PlannerConfig`] — model, docs enrichment, parse thresholds, template dirs

pub mod planner_params;

pub use planner_params::PlannerConfig;

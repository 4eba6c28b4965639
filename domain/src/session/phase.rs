//! Planning phase and project type value objects

use serde::{Deserialize, Serialize};

/// Phase of the planning state machine
///
/// `not_started → architect → layer_planning → group_planning → completed`,
/// where `layer_planning`/`group_planning` repeat once per layer and group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningPhase {
    #[default]
    NotStarted,
    Architect,
    LayerPlanning,
    GroupPlanning,
    Completed,
}

impl PlanningPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanningPhase::NotStarted => "not_started",
            PlanningPhase::Architect => "architect",
            PlanningPhase::LayerPlanning => "layer_planning",
            PlanningPhase::GroupPlanning => "group_planning",
            PlanningPhase::Completed => "completed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlanningPhase::NotStarted => "Not Started",
            PlanningPhase::Architect => "Technical Architect",
            PlanningPhase::LayerPlanning => "Layer Planner",
            PlanningPhase::GroupPlanning => "Group Planner",
            PlanningPhase::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for PlanningPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Greenfield (new project) or brownfield (existing codebase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    #[default]
    Greenfield,
    Brownfield,
}

impl ProjectType {
    pub fn from_greenfield(greenfield: bool) -> Self {
        if greenfield {
            ProjectType::Greenfield
        } else {
            ProjectType::Brownfield
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Greenfield => "greenfield",
            ProjectType::Brownfield => "brownfield",
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

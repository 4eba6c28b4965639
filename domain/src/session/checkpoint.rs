//! Checkpoint entity: the approval gate between planning phases

use super::phase::PlanningPhase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review status of a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl CheckpointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointStatus::Pending => "pending",
            CheckpointStatus::Approved => "approved",
            CheckpointStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for CheckpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An approval gate tied to one successful phase execution.
///
/// Once the status leaves `Pending` the checkpoint is never modified again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Sequential id, `cp-001`, `cp-002`, ...
    pub id: String,
    pub phase: PlanningPhase,
    pub description: String,
    #[serde(default)]
    pub status: CheckpointStatus,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub feedback: String,
    /// Paths of the documents this phase produced, in write order
    #[serde(default)]
    pub artifacts: Vec<String>,
    /// Layer the phase worked on (layer and group planning)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
    /// Group the phase worked on (group planning)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl Checkpoint {
    /// Format a sequence number as a checkpoint id.
    pub fn format_id(sequence: usize) -> String {
        format!("cp-{:03}", sequence)
    }

    pub fn new(
        id: impl Into<String>,
        phase: PlanningPhase,
        description: impl Into<String>,
        artifacts: Vec<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            phase,
            description: description.into(),
            status: CheckpointStatus::Pending,
            created,
            approved_at: None,
            feedback: String::new(),
            artifacts,
            layer_id: None,
            group_id: None,
        }
    }

    pub fn with_target(mut self, layer_id: Option<String>, group_id: Option<String>) -> Self {
        self.layer_id = layer_id;
        self.group_id = group_id;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == CheckpointStatus::Pending
    }

    /// Approve a pending checkpoint. Returns `false` (and changes nothing)
    /// if the checkpoint was already resolved.
    pub fn approve(&mut self, feedback: impl Into<String>, at: DateTime<Utc>) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = CheckpointStatus::Approved;
        self.approved_at = Some(at);
        self.feedback = feedback.into();
        true
    }

    /// Reject a pending checkpoint. Returns `false` (and changes nothing)
    /// if the checkpoint was already resolved.
    pub fn reject(&mut self, feedback: impl Into<String>) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = CheckpointStatus::Rejected;
        self.feedback = feedback.into();
        true
    }

    /// Multi-line rendering for terminal display.
    pub fn format_for_display(&self) -> String {
        let mut lines = vec![
            format!("Checkpoint: {}", self.id),
            format!("Phase: {}", self.phase.as_str()),
            format!("Status: {}", self.status.as_str()),
            format!("Created: {}", self.created.format("%Y-%m-%d %H:%M")),
            String::new(),
            format!("Description: {}", self.description),
        ];

        if !self.artifacts.is_empty() {
            lines.push(String::new());
            lines.push("Artifacts:".to_string());
            for artifact in &self.artifacts {
                lines.push(format!("  - {}", artifact));
            }
        }

        if !self.feedback.is_empty() {
            lines.push(String::new());
            lines.push(format!("Feedback: {}", self.feedback));
        }

        if let Some(approved_at) = self.approved_at {
            lines.push(format!("Approved: {}", approved_at.format("%Y-%m-%d %H:%M")));
        }

        lines.join("\n")
    }
}

/// Counts of checkpoints by status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointSummary {
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
    pub current_phase: PlanningPhase,
    pub can_proceed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkpoint() -> Checkpoint {
        Checkpoint::new(
            Checkpoint::format_id(1),
            PlanningPhase::Architect,
            "Architecture defined: 3 layers",
            vec!["planning/tech-stack.yaml".into()],
            Utc::now(),
        )
    }

    #[test]
    fn test_format_id_zero_pads() {
        assert_eq!(Checkpoint::format_id(1), "cp-001");
        assert_eq!(Checkpoint::format_id(42), "cp-042");
        assert_eq!(Checkpoint::format_id(1000), "cp-1000");
    }

    #[test]
    fn test_approve_only_once() {
        let mut cp = checkpoint();
        assert!(cp.approve("looks good", Utc::now()));
        assert_eq!(cp.status, CheckpointStatus::Approved);
        assert!(cp.approved_at.is_some());

        let before = cp.clone();
        assert!(!cp.approve("again", Utc::now()));
        assert!(!cp.reject("too late"));
        assert_eq!(cp, before);
    }

    #[test]
    fn test_reject_keeps_feedback() {
        let mut cp = checkpoint();
        assert!(cp.reject("use postgres"));
        assert_eq!(cp.status, CheckpointStatus::Rejected);
        assert_eq!(cp.feedback, "use postgres");
        assert!(cp.approved_at.is_none());
    }

    #[test]
    fn test_format_for_display() {
        let mut cp = checkpoint();
        cp.reject("needs a cache layer");
        let text = cp.format_for_display();
        assert!(text.starts_with("Checkpoint: cp-001\nPhase: architect\nStatus: rejected"));
        assert!(text.contains("  - planning/tech-stack.yaml"));
        assert!(text.contains("Feedback: needs a cache layer"));
        assert!(!text.contains("Approved:"));
    }
}

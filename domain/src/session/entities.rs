//! Planning session aggregate

use super::checkpoint::{Checkpoint, CheckpointStatus, CheckpointSummary};
use super::phase::{PlanningPhase, ProjectType};
use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root aggregate of a planning run, one per project.
///
/// Invariant: at most one checkpoint is `Pending` at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningSession {
    pub id: String,
    #[serde(default)]
    pub project_type: ProjectType,
    #[serde(default)]
    pub current_phase: PlanningPhase,
    #[serde(default)]
    pub target_repo: Option<PathBuf>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub current_layer_id: Option<String>,
    #[serde(default)]
    pub current_group_id: Option<String>,
    #[serde(default)]
    pub completed_layers: Vec<String>,
    #[serde(default)]
    pub completed_groups: Vec<String>,
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
}

impl PlanningSession {
    pub fn new(
        id: impl Into<String>,
        project_type: ProjectType,
        target_repo: Option<PathBuf>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            project_type,
            current_phase: PlanningPhase::NotStarted,
            target_repo,
            created: now,
            updated: now,
            current_layer_id: None,
            current_group_id: None,
            completed_layers: Vec::new(),
            completed_groups: Vec::new(),
            checkpoints: Vec::new(),
        }
    }

    /// Check the invariants of a session loaded from storage.
    pub fn validate(&self) -> Result<(), DomainError> {
        let pending: Vec<&str> = self
            .checkpoints
            .iter()
            .filter(|c| c.is_pending())
            .map(|c| c.id.as_str())
            .collect();
        if pending.len() > 1 {
            return Err(DomainError::InvalidState(format!(
                "at most one checkpoint may be pending, found {} ({})",
                pending.len(),
                pending.join(", ")
            )));
        }

        if self.project_type == ProjectType::Brownfield && self.target_repo.is_none() {
            return Err(DomainError::InvalidState(
                "brownfield session has no target repository".to_string(),
            ));
        }

        Ok(())
    }

    pub fn pending_checkpoint(&self) -> Option<&Checkpoint> {
        self.checkpoints.iter().find(|c| c.is_pending())
    }

    /// True when no checkpoint is waiting for review.
    pub fn can_proceed(&self) -> bool {
        self.pending_checkpoint().is_none()
    }

    /// Fail with `CheckpointPending` if a checkpoint is waiting for review.
    pub fn ensure_can_proceed(&self) -> Result<(), DomainError> {
        match self.pending_checkpoint() {
            Some(pending) => Err(DomainError::CheckpointPending {
                id: pending.id.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Append a new pending checkpoint with the next sequential id.
    pub fn add_checkpoint(
        &mut self,
        phase: PlanningPhase,
        description: impl Into<String>,
        artifacts: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<&Checkpoint, DomainError> {
        self.ensure_can_proceed()?;

        let id = Checkpoint::format_id(self.checkpoints.len() + 1);
        let checkpoint = Checkpoint::new(id, phase, description, artifacts, now).with_target(
            self.current_layer_id.clone(),
            match phase {
                PlanningPhase::GroupPlanning => self.current_group_id.clone(),
                _ => None,
            },
        );
        self.checkpoints.push(checkpoint);
        self.updated = now;

        // just pushed
        Ok(&self.checkpoints[self.checkpoints.len() - 1])
    }

    /// Approve the checkpoint with `id` if it is pending.
    pub fn approve_checkpoint(
        &mut self,
        id: &str,
        feedback: &str,
        now: DateTime<Utc>,
    ) -> Option<Checkpoint> {
        let checkpoint = self.checkpoints.iter_mut().find(|c| c.id == id)?;
        if !checkpoint.approve(feedback, now) {
            return None;
        }
        let approved = checkpoint.clone();
        self.updated = now;
        Some(approved)
    }

    /// Reject the checkpoint with `id` if it is pending.
    pub fn reject_checkpoint(
        &mut self,
        id: &str,
        feedback: &str,
        now: DateTime<Utc>,
    ) -> Option<Checkpoint> {
        let checkpoint = self.checkpoints.iter_mut().find(|c| c.id == id)?;
        if !checkpoint.reject(feedback) {
            return None;
        }
        let rejected = checkpoint.clone();
        self.updated = now;
        Some(rejected)
    }

    /// Feedback of the latest checkpoint for the same phase and target,
    /// if that checkpoint was rejected.
    pub fn rejection_feedback(
        &self,
        phase: PlanningPhase,
        layer_id: Option<&str>,
        group_id: Option<&str>,
    ) -> Option<&str> {
        let latest = self.checkpoints.iter().rev().find(|c| {
            c.phase == phase
                && match phase {
                    PlanningPhase::LayerPlanning => c.layer_id.as_deref() == layer_id,
                    PlanningPhase::GroupPlanning => c.group_id.as_deref() == group_id,
                    _ => true,
                }
        })?;
        (latest.status == CheckpointStatus::Rejected && !latest.feedback.is_empty())
            .then_some(latest.feedback.as_str())
    }

    pub fn is_layer_completed(&self, layer_id: &str) -> bool {
        self.completed_layers.iter().any(|id| id == layer_id)
    }

    pub fn is_group_completed(&self, group_id: &str) -> bool {
        self.completed_groups.iter().any(|id| id == group_id)
    }

    /// Record a completed layer. Returns `false` if it was already recorded.
    pub fn mark_layer_completed(&mut self, layer_id: &str) -> bool {
        if self.is_layer_completed(layer_id) {
            return false;
        }
        self.completed_layers.push(layer_id.to_string());
        true
    }

    /// Record a completed group. Returns `false` if it was already recorded.
    pub fn mark_group_completed(&mut self, group_id: &str) -> bool {
        if self.is_group_completed(group_id) {
            return false;
        }
        self.completed_groups.push(group_id.to_string());
        true
    }

    /// Remove a group from the completed set so it is planned again.
    pub fn reopen_group(&mut self, group_id: &str) -> bool {
        let before = self.completed_groups.len();
        self.completed_groups.retain(|id| id != group_id);
        before != self.completed_groups.len()
    }

    pub fn checkpoint_summary(&self) -> CheckpointSummary {
        let count = |status: CheckpointStatus| {
            self.checkpoints
                .iter()
                .filter(|c| c.status == status)
                .count()
        };
        let pending = count(CheckpointStatus::Pending);

        CheckpointSummary {
            total: self.checkpoints.len(),
            approved: count(CheckpointStatus::Approved),
            rejected: count(CheckpointStatus::Rejected),
            pending,
            current_phase: self.current_phase,
            can_proceed: pending == 0,
        }
    }
}

//! Checkpoint Manager
//!
//! Owns persistence of the planning session and the approval gate between
//! phases. Every mutation is written through to `planning/session.yaml`.

use super::repository::PlanningRepository;
use crate::error::PlannerError;
use chrono::Utc;
use planner_domain::{Checkpoint, CheckpointSummary, PlanningPhase, PlanningSession};
use tracing::info;

pub struct CheckpointManager {
    repository: PlanningRepository,
}

impl CheckpointManager {
    pub fn new(repository: PlanningRepository) -> Self {
        Self { repository }
    }

    /// Load the persisted session and check its invariants.
    pub fn load_session(&self) -> Result<Option<PlanningSession>, PlannerError> {
        let session = self.repository.load_session()?;
        if let Some(session) = &session {
            session.validate()?;
        }
        Ok(session)
    }

    pub fn save_session(&self, session: &mut PlanningSession) -> Result<(), PlannerError> {
        session.updated = Utc::now();
        self.repository.save_session(session)?;
        Ok(())
    }

    /// Append a pending checkpoint and persist the session.
    ///
    /// Fails with `CheckpointPending` if another checkpoint is still open.
    pub fn create_checkpoint(
        &self,
        session: &mut PlanningSession,
        phase: PlanningPhase,
        description: &str,
        artifacts: Vec<String>,
    ) -> Result<Checkpoint, PlannerError> {
        let checkpoint = session
            .add_checkpoint(phase, description, artifacts, Utc::now())?
            .clone();
        self.save_session(session)?;
        info!("Created checkpoint {} for {}: {}", checkpoint.id, phase, description);
        Ok(checkpoint)
    }

    /// Approve `id` if it is pending. `None` when it is not.
    pub fn approve(
        &self,
        session: &mut PlanningSession,
        id: &str,
        feedback: &str,
    ) -> Result<Option<Checkpoint>, PlannerError> {
        let Some(checkpoint) = session.approve_checkpoint(id, feedback, Utc::now()) else {
            return Ok(None);
        };
        self.save_session(session)?;
        info!("Approved checkpoint {}", checkpoint.id);
        Ok(Some(checkpoint))
    }

    /// Reject `id` if it is pending. `None` when it is not.
    pub fn reject(
        &self,
        session: &mut PlanningSession,
        id: &str,
        feedback: &str,
    ) -> Result<Option<Checkpoint>, PlannerError> {
        let Some(checkpoint) = session.reject_checkpoint(id, feedback, Utc::now()) else {
            return Ok(None);
        };
        self.save_session(session)?;
        info!("Rejected checkpoint {}: {}", checkpoint.id, feedback);
        Ok(Some(checkpoint))
    }

    pub fn pending<'a>(&self, session: &'a PlanningSession) -> Option<&'a Checkpoint> {
        session.pending_checkpoint()
    }

    /// Error if a phase may not start because a checkpoint is open.
    pub fn ensure_can_proceed(&self, session: &PlanningSession) -> Result<(), PlannerError> {
        Ok(session.ensure_can_proceed()?)
    }

    pub fn summary(&self, session: &PlanningSession) -> CheckpointSummary {
        session.checkpoint_summary()
    }

    pub fn list(&self, session: &PlanningSession) -> Vec<Checkpoint> {
        session.checkpoints.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryArtifactStore;
    use planner_domain::{CheckpointStatus, DomainError, ProjectType};
    use std::sync::Arc;

    fn manager() -> (CheckpointManager, PlanningRepository, Arc<MemoryArtifactStore>) {
        let store = Arc::new(MemoryArtifactStore::new());
        let repo = PlanningRepository::new(store.clone());
        (CheckpointManager::new(repo.clone()), repo, store)
    }

    fn session() -> PlanningSession {
        PlanningSession::new("plan-00000001", ProjectType::Greenfield, None, Utc::now())
    }

    #[test]
    fn test_create_persists() {
        let (manager, repo, _) = manager();
        let mut session = session();

        let cp = manager
            .create_checkpoint(&mut session, PlanningPhase::Architect, "Architecture defined: 2 layers", vec![])
            .unwrap();

        assert_eq!(cp.id, "cp-001");
        assert!(manager.ensure_can_proceed(&session).is_err());
        let stored = repo.load_session().unwrap().unwrap();
        assert_eq!(stored.checkpoints.len(), 1);
        assert_eq!(manager.pending(&stored).unwrap().id, "cp-001");
    }

    #[test]
    fn test_second_pending_is_rejected() {
        let (manager, _, _) = manager();
        let mut session = session();
        manager
            .create_checkpoint(&mut session, PlanningPhase::Architect, "first", vec![])
            .unwrap();

        let err = manager
            .create_checkpoint(&mut session, PlanningPhase::Architect, "second", vec![])
            .unwrap_err();
        assert!(matches!(
            err,
            PlannerError::Domain(DomainError::CheckpointPending { ref id }) if id == "cp-001"
        ));
        assert_eq!(session.checkpoints.len(), 1);
        assert!(manager.ensure_can_proceed(&session).is_err());
    }

    #[test]
    fn test_approve_then_noop() {
        let (manager, _, _) = manager();
        let mut session = session();
        manager
            .create_checkpoint(&mut session, PlanningPhase::Architect, "arch", vec![])
            .unwrap();

        let approved = manager.approve(&mut session, "cp-001", "ok").unwrap().unwrap();
        assert_eq!(approved.status, CheckpointStatus::Approved);

        let before = session.checkpoints.clone();
        assert!(manager.approve(&mut session, "cp-001", "again").unwrap().is_none());
        assert!(manager.reject(&mut session, "cp-001", "late").unwrap().is_none());
        assert!(manager.approve(&mut session, "cp-404", "").unwrap().is_none());
        assert_eq!(session.checkpoints, before);
    }

    #[test]
    fn test_rejected_allows_retry_checkpoint() {
        let (manager, _, _) = manager();
        let mut session = session();
        manager
            .create_checkpoint(&mut session, PlanningPhase::Architect, "arch", vec![])
            .unwrap();
        manager.reject(&mut session, "cp-001", "use postgres").unwrap();

        let retry = manager
            .create_checkpoint(&mut session, PlanningPhase::Architect, "arch again", vec![])
            .unwrap();
        assert_eq!(retry.id, "cp-002");

        let summary = manager.summary(&session);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.pending, 1);
        assert!(!summary.can_proceed);
    }

    #[test]
    fn test_load_rejects_two_pending() {
        let (manager, repo, _) = manager();
        let mut session = session();
        session.checkpoints = vec![
            Checkpoint::new("cp-001", PlanningPhase::Architect, "a", vec![], Utc::now()),
            Checkpoint::new("cp-002", PlanningPhase::Architect, "b", vec![], Utc::now()),
        ];
        repo.save_session(&session).unwrap();

        let err = manager.load_session().unwrap_err();
        assert!(matches!(err, PlannerError::Domain(DomainError::InvalidState(_))));
    }
}

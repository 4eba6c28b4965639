//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Every variant is a contract violation by the caller or a corrupted
/// session document. Recoverable LLM output problems are not errors: they
/// are reported as [`ParseFailure`](crate::parsing::ParseFailure) values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No planning session. Start one with `start` first.")]
    NoSession,

    #[error("Pending checkpoint {id}. Approve or reject it before continuing.")]
    CheckpointPending { id: String },

    #[error("Planning is complete.")]
    PlanningComplete,

    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    #[error("Unknown group '{group_id}' in layer '{layer_id}'")]
    UnknownGroup { layer_id: String, group_id: String },

    #[error("Dependency cycle in {scope}: {}", path.join(" -> "))]
    DependencyCycle { scope: String, path: Vec<String> },

    #[error("Brownfield planning requires a target repository")]
    MissingTargetRepo,

    #[error("Invalid session state: {0}")]
    InvalidState(String),
}

impl DomainError {
    /// Whether this error is a precondition the caller should have checked
    /// (no session, pending checkpoint, nothing left to plan).
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            DomainError::NoSession
                | DomainError::CheckpointPending { .. }
                | DomainError::PlanningComplete
                | DomainError::MissingTargetRepo
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_pending_display() {
        let error = DomainError::CheckpointPending {
            id: "cp-002".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Pending checkpoint cp-002. Approve or reject it before continuing."
        );
    }

    #[test]
    fn test_cycle_display_joins_path() {
        let error = DomainError::DependencyCycle {
            scope: "layers".to_string(),
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(error.to_string(), "Dependency cycle in layers: a -> b -> a");
    }

    #[test]
    fn test_is_precondition() {
        assert!(DomainError::NoSession.is_precondition());
        assert!(DomainError::PlanningComplete.is_precondition());
        assert!(
            DomainError::CheckpointPending {
                id: "cp-001".into()
            }
            .is_precondition()
        );
        assert!(!DomainError::InvalidState("x".into()).is_precondition());
        assert!(!DomainError::UnknownLayer("layer-09".into()).is_precondition());
    }
}

//! Application-level error type

use crate::ports::artifact_store::StoreError;
use crate::ports::codebase_scanner::ScanError;
use crate::ports::llm_gateway::GatewayError;
use planner_domain::DomainError;
use thiserror::Error;

/// Errors raised by the planning use cases.
///
/// Parse failures are not here: they are business outcomes carried inside
/// a [`PhaseResult`](crate::use_cases::phases::PhaseResult).
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Codebase analysis failed: {0}")]
    Scan(#[from] ScanError),

    #[error("LLM request failed: {0}")]
    RequestFailed(String),

    #[error("Phase cancelled")]
    Cancelled,
}

impl From<GatewayError> for PlannerError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Cancelled => PlannerError::Cancelled,
            other => PlannerError::RequestFailed(other.to_string()),
        }
    }
}

impl PlannerError {
    /// Whether this error is caller misuse (no session, pending checkpoint,
    /// nothing left to plan).
    pub fn is_precondition(&self) -> bool {
        matches!(self, PlannerError::Domain(e) if e.is_precondition())
    }
}

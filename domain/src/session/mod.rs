//! Planning session subdomain.
//!
//! - [`phase::PlanningPhase`] — the phase state machine's states
//! - [`checkpoint::Checkpoint`] — approval gate created after a phase succeeds
//! - [`entities::PlanningSession`] — root aggregate persisted as `planning/session.yaml`

pub mod checkpoint;
pub mod entities;
pub mod phase;

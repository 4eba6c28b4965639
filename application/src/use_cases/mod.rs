//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod checkpoints;
pub mod context_builder;
pub mod conversation;
pub mod orchestrator;
pub mod phases;
pub mod repository;

//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] — contract violations raised by the planner
//! - [`lenient`] — serde helpers for values written loosely by an LLM

pub mod error;
pub mod lenient;

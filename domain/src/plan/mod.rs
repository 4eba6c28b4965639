//! Phase output documents.
//!
//! Each document is owned by the session transitively: it is stored under
//! `planning/` and referenced by path, never embedded in the session.

pub mod codebase;
pub mod graph;
pub mod groups;
pub mod layers;
pub mod task;
pub mod tech_stack;

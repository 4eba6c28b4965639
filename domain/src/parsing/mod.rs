//! Parsing of semi-structured LLM replies into phase output documents.
//!
//! Each phase expects its reply to carry one or more structured blocks.
//! Parsers never panic and never return an error type that escapes the
//! phase: every problem is described by a [`ParseFailure`] naming the
//! block and what was wrong with it.

pub mod architect;
pub mod blocks;
pub mod failure;
pub mod groups;
pub mod tasks;

pub use architect::{ArchitectDraft, parse_architect};
pub use failure::{BlockKind, FailureKind, ParseFailure};
pub use groups::{GroupsDraft, parse_groups};
pub use tasks::parse_tasks;

/// Minimum entry counts for a reply to count as actionable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseThresholds {
    pub min_groups: usize,
    pub min_tasks: usize,
}

impl Default for ParseThresholds {
    fn default() -> Self {
        Self {
            min_groups: 1,
            min_tasks: 1,
        }
    }
}

/// Layer and group ids name storage directories, so they must be a single
/// plain path segment.
pub(crate) fn is_path_segment(id: &str) -> bool {
    !matches!(id, "." | "..") && !id.contains(['/', '\\'])
}

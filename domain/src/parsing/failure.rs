//! Structured diagnostics for LLM output that could not be parsed

use thiserror::Error;

/// The structured block a phase expects in the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    TechStack,
    Layers,
    Groups,
    Tasks,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::TechStack => "tech_stack",
            BlockKind::Layers => "layers",
            BlockKind::Groups => "groups",
            BlockKind::Tasks => "tasks",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What went wrong with a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// No block with the required keys was found
    Missing,
    /// The block was found but failed to deserialize or validate
    Malformed(String),
    /// The block parsed but has fewer entries than the configured minimum
    BelowMinimum { found: usize, required: usize },
}

/// Why a phase reply could not be turned into typed output.
///
/// Carried as data inside a phase result; never raised past the phase.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", self.describe())]
pub struct ParseFailure {
    pub block: BlockKind,
    pub kind: FailureKind,
}

impl ParseFailure {
    pub fn missing(block: BlockKind) -> Self {
        Self {
            block,
            kind: FailureKind::Missing,
        }
    }

    pub fn malformed(block: BlockKind, detail: impl Into<String>) -> Self {
        Self {
            block,
            kind: FailureKind::Malformed(detail.into()),
        }
    }

    pub fn below_minimum(block: BlockKind, found: usize, required: usize) -> Self {
        Self {
            block,
            kind: FailureKind::BelowMinimum { found, required },
        }
    }

    fn describe(&self) -> String {
        match &self.kind {
            FailureKind::Missing => format!("{} block not found", self.block),
            FailureKind::Malformed(detail) => {
                format!("{} block is malformed: {}", self.block, detail)
            }
            FailureKind::BelowMinimum { found, required } => format!(
                "{} block has {} entries, at least {} required",
                self.block, found, required
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_block() {
        assert_eq!(
            ParseFailure::missing(BlockKind::Layers).to_string(),
            "layers block not found"
        );
        assert_eq!(
            ParseFailure::below_minimum(BlockKind::Groups, 0, 1).to_string(),
            "groups block has 0 entries, at least 1 required"
        );
        assert_eq!(
            ParseFailure::malformed(BlockKind::TechStack, "bad indent").to_string(),
            "tech_stack block is malformed: bad indent"
        );
    }
}

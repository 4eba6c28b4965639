//! Domain layer for layered-planner
//!
//! This crate contains the planning entities, value objects and the pure
//! logic that operates on them. It has no dependencies on storage, network
//! or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Planning session
//!
//! A [`PlanningSession`] walks a project through four phases:
//!
//! - **Architect**: tech stack and architecture layers
//! - **Layer planning**: each layer split into functional groups
//! - **Group planning**: each group split into task documents
//! - **Completed**
//!
//! ## Checkpoints
//!
//! Every successful phase ends in a [`Checkpoint`] that must be approved or
//! rejected before the next phase may start. At most one checkpoint is
//! pending at any time.
//!
//! ## Structured replies
//!
//! Phase replies are semi-structured text. The [`parsing`] module turns them
//! into typed documents or a [`ParseFailure`] describing which block failed.

pub mod conversation;
pub mod core;
pub mod parsing;
pub mod persona;
pub mod plan;
pub mod product;
pub mod prompt;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use conversation::{Message, Role, StreamEvent};
pub use core::error::DomainError;
pub use parsing::{
    ArchitectDraft, BlockKind, FailureKind, GroupsDraft, ParseFailure, ParseThresholds,
    parse_architect, parse_groups, parse_tasks,
};
pub use persona::{Persona, Specialization};
pub use plan::{
    codebase::{CodebaseAnalysis, DirectoryNode, DirectorySummary, ExistingPattern},
    graph::DependencyReport,
    groups::{ContractExport, ContractInterface, Group, GroupContract, GroupDefinition},
    layers::{Layer, LayerDefinition},
    task::TaskDocument,
    tech_stack::{
        DatabaseConfig, Dependency, FrameworkConfig, RuntimeConfig, TechStack, TestingConfig,
    },
};
pub use product::{ArtifactStatus, Feature, Priority, ProductParseError, Requirement};
pub use prompt::PhasePrompt;
pub use session::{
    checkpoint::{Checkpoint, CheckpointStatus, CheckpointSummary},
    entities::PlanningSession,
    phase::{PlanningPhase, ProjectType},
};
pub use util::{normalize_tech_name, truncate_chars};

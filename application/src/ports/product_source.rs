//! Product source port
//!
//! Read-only access to the product artifacts the architect phase starts
//! from: the PRD, feature files and requirement files.

use planner_domain::{Feature, Requirement};

use super::artifact_store::StoreError;

/// Source of product artifacts.
///
/// Files that cannot be parsed are skipped by the adapter (and logged);
/// only I/O failures surface as errors.
pub trait ProductSource: Send + Sync {
    /// PRD text, if the project has one.
    fn load_prd(&self) -> Result<Option<String>, StoreError>;

    fn load_features(&self) -> Result<Vec<Feature>, StoreError>;

    /// Functional requirements first, then non-functional ones.
    fn load_requirements(&self) -> Result<Vec<Requirement>, StoreError>;
}

//! Markdown product source
//!
//! Reads the PRD, `features/F-*.md` and `requirements/**/{FR,NFR}-*.md`
//! from the project. Feature and requirement files that fail to parse are
//! skipped with a warning.

use super::fs_store::FsArtifactStore;
use planner_application::ports::artifact_store::{ArtifactStore, StoreError};
use planner_application::ports::product_source::ProductSource;
use planner_domain::{Feature, ProductParseError, Requirement};
use tracing::{debug, warn};

const PRD_PATHS: [&str; 2] = ["PRD.md", "docs/PRD.md"];
const FEATURES_DIR: &str = "features";
const FUNCTIONAL_DIR: &str = "requirements/functional";
const NON_FUNCTIONAL_DIR: &str = "requirements/non-functional";

pub struct MarkdownProductSource {
    store: FsArtifactStore,
}

impl MarkdownProductSource {
    pub fn new(store: FsArtifactStore) -> Self {
        Self { store }
    }

    /// Parse every `<prefix>*.md` file in `dir`, in file-name order.
    fn load_dir<T>(
        &self,
        dir: &str,
        prefix: &str,
        parse: impl Fn(&str) -> Result<T, ProductParseError>,
    ) -> Result<Vec<T>, StoreError> {
        let mut items = Vec::new();
        for name in self.store.list(dir)? {
            if !name.starts_with(prefix) || !name.ends_with(".md") {
                continue;
            }
            let path = format!("{}/{}", dir, name);
            let Some(text) = self.store.read(&path)? else {
                continue;
            };
            match parse(&text) {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping {}: {}", path, e),
            }
        }
        debug!("Loaded {} artifacts from {}", items.len(), dir);
        Ok(items)
    }
}

impl ProductSource for MarkdownProductSource {
    fn load_prd(&self) -> Result<Option<String>, StoreError> {
        for path in PRD_PATHS {
            if let Some(text) = self.store.read(path)? {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }

    fn load_features(&self) -> Result<Vec<Feature>, StoreError> {
        self.load_dir(FEATURES_DIR, "F-", Feature::from_markdown)
    }

    fn load_requirements(&self) -> Result<Vec<Requirement>, StoreError> {
        let mut requirements =
            self.load_dir(FUNCTIONAL_DIR, "FR-", |text| Requirement::from_markdown(text, true))?;
        requirements.extend(self.load_dir(NON_FUNCTIONAL_DIR, "NFR-", |text| {
            Requirement::from_markdown(text, false)
        })?);
        Ok(requirements)
    }
}

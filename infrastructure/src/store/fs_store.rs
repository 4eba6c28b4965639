//! Filesystem artifact store
//!
//! Implements [`ArtifactStore`] over a project root directory. Logical
//! paths are `/`-separated and relative to the root; `..` components are
//! refused.

use planner_application::ports::artifact_store::{ArtifactStore, StoreError};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Artifact store rooted at a project directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a logical path against the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(StoreError::io(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "path leaves the project root"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl ArtifactStore for FsArtifactStore {
    fn read(&self, path: &str) -> Result<Option<String>, StoreError> {
        let full = self.resolve(path)?;
        match fs::read_to_string(&full) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn write(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(path, e))?;
        }
        fs::write(&full, content).map_err(|e| StoreError::io(path, e))?;
        debug!("Wrote {} ({} bytes)", path, content.len());
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<bool, StoreError> {
        let full = self.resolve(path)?;
        let result = if full.is_dir() {
            fs::remove_dir_all(&full)
        } else {
            fs::remove_file(&full)
        };
        match result {
            Ok(()) => {
                debug!("Removed {}", path);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, StoreError> {
        let full = self.resolve(dir)?;
        let entries = match fs::read_dir(&full) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(dir, e))?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.exists()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());

        store
            .write("planning/groups/layer-01/groups.yaml", "layer_id: layer-01\n")
            .unwrap();

        assert!(dir.path().join("planning/groups/layer-01/groups.yaml").is_file());
        assert_eq!(
            store.read("planning/groups/layer-01/groups.yaml").unwrap().as_deref(),
            Some("layer_id: layer-01\n")
        );
        assert!(store.exists("planning/groups"));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        assert!(store.read("planning/session.yaml").unwrap().is_none());
        assert!(store.list("planning/tasks/g1").unwrap().is_empty());
        assert!(!store.remove("planning/layers.yaml").unwrap());
    }

    #[test]
    fn test_list_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        store.write("planning/tasks/g1/T-002.md", "b").unwrap();
        store.write("planning/tasks/g1/T-001.md", "a").unwrap();

        assert_eq!(
            store.list("planning/tasks/g1").unwrap(),
            vec!["T-001.md", "T-002.md"]
        );
    }

    #[test]
    fn test_remove_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        store.write("planning/tasks/g1/T-001.md", "a").unwrap();

        assert!(store.remove("planning/tasks/g1").unwrap());
        assert!(!store.exists("planning/tasks/g1/T-001.md"));
    }

    #[test]
    fn test_parent_components_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        let err = store.write("../outside.md", "x").unwrap_err();
        assert_eq!(err.path(), "../outside.md");
        assert!(!store.exists("../outside.md"));
    }
}

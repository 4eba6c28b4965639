//! Documentation fetcher port
//!
//! Fills the `docs/tech/<name>/summary.md` cache from a package registry.
//! Every failure is advisory: a fetch that does not work returns `None`.

use async_trait::async_trait;
use std::str::FromStr;

/// Package registry a technology is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Registry {
    #[default]
    Npm,
    Pypi,
}

impl Registry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Registry::Npm => "npm",
            Registry::Pypi => "pypi",
        }
    }
}

impl std::fmt::Display for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Registry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "npm" => Ok(Registry::Npm),
            "pypi" | "pip" => Ok(Registry::Pypi),
            other => Err(format!("unknown registry '{}' (expected npm or pypi)", other)),
        }
    }
}

/// Cache-fill for third-party technology documentation
#[async_trait]
pub trait DocsFetcher: Send + Sync {
    /// Fetch and cache docs for one technology. Returns the logical path of
    /// the cached summary, or `None` if nothing could be fetched.
    async fn fetch(&self, name: &str, registry: Registry) -> Option<String>;

    /// Fetch docs for several technologies, skipping failures. Returns the
    /// names that are now cached.
    async fn fetch_many(&self, names: &[String]) -> Vec<String>;
}

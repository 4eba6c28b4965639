//! Third-party technology documentation cache.

mod registry;

pub use registry::{DocsSettings, RegistryDocsFetcher, registry_for, summarize};

//! Project filesystem adapters: artifact store and product source.

mod fs_store;
mod product_source;

pub use fs_store::FsArtifactStore;
pub use product_source::MarkdownProductSource;

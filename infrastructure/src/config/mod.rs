//! Configuration file loading for layered-planner
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `planner.toml` or `.planner.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/layered-planner/config.toml`
//! 4. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileDocsConfig, FileLoggingConfig, FilePlannerConfig,
};
pub use loader::ConfigLoader;

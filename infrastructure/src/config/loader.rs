//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "layered-planner";
const PROJECT_FILES: [&str; 2] = ["planner.toml", ".planner.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `planner.toml` or `.planner.toml`
    /// 3. Global: `$XDG_CONFIG_HOME/layered-planner/config.toml`
    /// 4. Default values
    pub fn load(
        project_dir: &Path,
        config_path: Option<&Path>,
    ) -> Result<FileConfig, Box<figment::Error>> {
        Self::load_from(Self::global_config_path(), project_dir, config_path)
    }

    /// [`load`](Self::load) with an explicit global config location.
    pub fn load_from(
        global_path: Option<PathBuf>,
        project_dir: &Path,
        config_path: Option<&Path>,
    ) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = global_path
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path(project_dir) {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path(project_dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| project_dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(project_dir: &Path, config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<7}] Explicit: {}", mark, path.display());
        }

        match Self::project_config_path(project_dir) {
            Some(path) => println!("  [FOUND  ] Project: {}", path.display()),
            None => println!(
                "  [       ] Project: {}/planner.toml or .planner.toml",
                project_dir.display()
            ),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "" };
            println!("  [{:<7}] Global:  {}", mark, path.display());
        }

        println!("  [       ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.planner.model, "claude");
        assert!(config.models.is_empty());
    }

    #[test]
    fn test_global_config_path() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.ends_with("layered-planner/config.toml"));
        }
    }

    #[test]
    fn test_sources_merge_in_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        fs::write(
            &global,
            "[planner]\nmodel = \"opus\"\nmin_groups = 4\n\n[docs]\nsummary_chars = 4000\n",
        )
        .unwrap();

        let project = dir.path().join("project");
        fs::create_dir(&project).unwrap();
        fs::write(project.join(".planner.toml"), "[planner]\nmodel = \"sonnet\"\n").unwrap();

        let explicit = dir.path().join("ci.toml");
        fs::write(&explicit, "[planner]\nfetch_docs = false\n").unwrap();

        let config =
            ConfigLoader::load_from(Some(global), &project, Some(explicit.as_path())).unwrap();
        assert_eq!(config.planner.model, "sonnet");
        assert_eq!(config.planner.min_groups, 4);
        assert!(!config.planner.fetch_docs);
        assert_eq!(config.docs.summary_chars, 4000);
        assert_eq!(config.docs.section_chars, 2000);
    }

    #[test]
    fn test_project_file_preference() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigLoader::project_config_path(dir.path()).is_none());

        fs::write(dir.path().join(".planner.toml"), "").unwrap();
        fs::write(dir.path().join("planner.toml"), "").unwrap();
        assert_eq!(
            ConfigLoader::project_config_path(dir.path()),
            Some(dir.path().join("planner.toml"))
        );
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("planner.toml"), "[planner]\nmin_tasks = \"many\"\n").unwrap();
        assert!(ConfigLoader::load_from(None, dir.path(), None).is_err());
    }
}

//! Brownfield codebase analyzer
//!
//! Reads manifest files to find the package manager and dependencies,
//! infers language and framework, summarises the common top-level
//! directories and derives the constraints new work must respect.

use chrono::Utc;
use planner_application::ports::codebase_scanner::{CodebaseScanner, ScanError};
use planner_domain::{
    CodebaseAnalysis, Dependency, DirectoryNode, DirectorySummary, ExistingPattern,
};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Top-level directories included in the structure summary
const COMMON_DIRS: &[&str] = &[
    "src", "lib", "app", "api", "components", "pages", "routes", "models", "services", "utils",
    "helpers", "tests", "test", "__tests__", "spec", "config", "scripts", "public", "static",
    "assets",
];

/// Nesting below a common directory that is still listed
const MAX_DEPTH: usize = 2;

const JS_FRAMEWORKS: &[(&str, &str)] = &[
    ("next", "next"),
    ("react", "react"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    ("hono", "hono"),
    ("express", "express"),
    ("fastify", "fastify"),
    ("@nestjs/core", "nestjs"),
];

const PYTHON_FRAMEWORKS: &[(&str, &str)] = &[
    ("django", "django"),
    ("flask", "flask"),
    ("fastapi", "fastapi"),
    ("starlette", "starlette"),
];

const GO_FRAMEWORKS: &[(&str, &str)] = &[
    ("github.com/gin-gonic/gin", "gin"),
    ("github.com/labstack/echo", "echo"),
    ("github.com/gofiber/fiber", "fiber"),
];

const TEST_FRAMEWORKS: &[&str] = &["vitest", "jest", "mocha", "pytest", "go-test"];

static PY_REQUIREMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_.-]+)\s*(?:\[[^\]]*\])?\s*([<>=!~]+\s*\S+)?").unwrap());

static GO_REQUIRE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)require\s*\((.*?)\)").unwrap());

/// Filesystem implementation of [`CodebaseScanner`].
#[derive(Debug, Clone, Default)]
pub struct CodebaseAnalyzer;

impl CodebaseAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl CodebaseScanner for CodebaseAnalyzer {
    fn analyze(&self, root: &Path) -> Result<CodebaseAnalysis, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::NotFound(root.to_path_buf()));
        }

        let mut analysis = CodebaseAnalysis::new(Utc::now());
        Scan { root }.run(&mut analysis)?;
        debug!(
            "Analyzed {}: {} deps, {} patterns",
            root.display(),
            analysis.existing_dependencies.len(),
            analysis.patterns.len()
        );
        Ok(analysis)
    }
}

/// One analysis run over `root`
struct Scan<'a> {
    root: &'a Path,
}

impl Scan<'_> {
    fn run(&self, analysis: &mut CodebaseAnalysis) -> Result<(), ScanError> {
        self.package_manager(analysis)?;
        self.language_and_framework(analysis);
        analysis.directory_structure = self.directory_structure()?;
        analysis.patterns = self.patterns(analysis)?;
        analysis.constraints = self.constraints(analysis);
        Ok(())
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Manifest text, `None` when the file is absent.
    fn read(&self, name: &str) -> Result<Option<String>, ScanError> {
        let path = self.path(name);
        if !path.is_file() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| ScanError::Io { path, source })
    }

    // ==================== Dependencies ====================

    fn package_manager(&self, analysis: &mut CodebaseAnalysis) -> Result<(), ScanError> {
        if let Some(text) = self.read("package.json")? {
            analysis.package_manager = "npm".into();
            analysis.existing_dependencies = npm_dependencies(&text);
        } else if let Some(text) = self.read("pyproject.toml")? {
            analysis.package_manager = "pip".into();
            analysis.existing_dependencies = pyproject_dependencies(&text);
        } else if let Some(text) = self.read("requirements.txt")? {
            analysis.package_manager = "pip".into();
            analysis.existing_dependencies = text.lines().filter_map(python_requirement).collect();
        } else if let Some(text) = self.read("go.mod")? {
            analysis.package_manager = "go".into();
            analysis.existing_dependencies = go_dependencies(&text);
        } else if let Some(text) = self.read("Cargo.toml")? {
            analysis.package_manager = "cargo".into();
            analysis.existing_dependencies = cargo_dependencies(&text);
        }
        Ok(())
    }

    fn language_and_framework(&self, analysis: &mut CodebaseAnalysis) {
        let (language, table): (&str, &[(&str, &str)]) = match analysis.package_manager.as_str() {
            "npm" if self.path("tsconfig.json").is_file() => ("typescript", JS_FRAMEWORKS),
            "npm" => ("javascript", JS_FRAMEWORKS),
            "pip" => ("python", PYTHON_FRAMEWORKS),
            "go" => ("go", GO_FRAMEWORKS),
            "cargo" => ("rust", &[]),
            _ => return,
        };
        analysis.detected_language = language.into();

        let framework = table
            .iter()
            .find(|(dep, _)| {
                analysis
                    .existing_dependencies
                    .iter()
                    .any(|d| d.name.eq_ignore_ascii_case(dep))
            })
            .map(|(_, framework)| *framework);
        analysis.detected_framework = match (framework, language) {
            (Some(framework), _) => framework.into(),
            (None, "go") => "standard-library".into(),
            (None, "rust") => String::new(),
            (None, _) => "unknown".into(),
        };
    }

    // ==================== Structure ====================

    fn directory_structure(&self) -> Result<BTreeMap<String, DirectorySummary>, ScanError> {
        let mut structure = BTreeMap::new();
        for name in COMMON_DIRS {
            let path = self.path(name);
            if path.is_dir() {
                structure.insert(name.to_string(), summarize_dir(&path, 1)?);
            }
        }
        Ok(structure)
    }

    fn patterns(&self, analysis: &CodebaseAnalysis) -> Result<Vec<ExistingPattern>, ScanError> {
        let dirs = &analysis.directory_structure;
        let mut patterns = Vec::new();

        if dirs.contains_key("components") {
            patterns.push(ExistingPattern::new(
                "Component-based UI",
                "UI is organized into reusable components",
                vec!["components/".into()],
            ));
        }
        if dirs.contains_key("services") {
            patterns.push(ExistingPattern::new(
                "Service Layer",
                "Business logic is organized into services",
                vec!["services/".into()],
            ));
        }
        if dirs.contains_key("models") {
            patterns.push(ExistingPattern::new(
                "Model Layer",
                "Data models are defined separately",
                vec!["models/".into()],
            ));
        }
        if dirs.contains_key("routes") || dirs.contains_key("api") {
            patterns.push(ExistingPattern::new(
                "Route-based API",
                "API is organized by routes",
                vec!["routes/".into(), "api/".into()],
            ));
        }

        let src = self.path("src");
        if src.is_dir() {
            let mut files = Vec::new();
            collect_files(&src, &mut files)?;
            let relative = |p: &PathBuf| {
                p.strip_prefix(self.root)
                    .unwrap_or(p.as_path())
                    .to_string_lossy()
                    .replace('\\', "/")
            };

            let index_files: Vec<String> = files
                .iter()
                .filter(|p| matches!(file_name(p), "index.ts" | "index.js"))
                .map(relative)
                .collect();
            if index_files.len() > 3 {
                patterns.push(ExistingPattern::new(
                    "Barrel Exports",
                    "Modules use index files for clean exports",
                    index_files.into_iter().take(5).collect(),
                ));
            }

            let test_files: Vec<String> = files
                .iter()
                .filter(|p| {
                    let name = file_name(p);
                    name.ends_with(".test.ts") || name.ends_with(".spec.ts")
                })
                .map(relative)
                .collect();
            if !test_files.is_empty() {
                patterns.push(ExistingPattern::new(
                    "Colocated Tests",
                    "Tests are placed alongside source files",
                    test_files.into_iter().take(5).collect(),
                ));
            }
        }

        Ok(patterns)
    }

    fn constraints(&self, analysis: &CodebaseAnalysis) -> Vec<String> {
        let mut constraints = Vec::new();

        if !analysis.detected_language.is_empty() {
            constraints.push(format!("Must use {}", analysis.detected_language));
        }
        if !analysis.detected_framework.is_empty() && analysis.detected_framework != "unknown" {
            constraints.push(format!(
                "Must be compatible with {} framework",
                analysis.detected_framework
            ));
        }
        if !analysis.package_manager.is_empty() {
            constraints.push(format!(
                "Must use {} for dependency management",
                analysis.package_manager
            ));
        }
        if analysis.detected_language == "typescript" && self.strict_typescript() {
            constraints.push("Must follow strict TypeScript mode".into());
        }
        if let Some(dep) = analysis
            .existing_dependencies
            .iter()
            .find(|d| TEST_FRAMEWORKS.contains(&d.name.as_str()))
        {
            constraints.push(format!("Tests must use {}", dep.name));
        }
        if self.path(".eslintrc.json").exists() || self.path(".prettierrc").exists() {
            constraints.push("Must pass existing linting rules".into());
        }

        constraints
    }

    fn strict_typescript(&self) -> bool {
        let Ok(Some(text)) = self.read("tsconfig.json") else {
            return false;
        };
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => value["compilerOptions"]["strict"].as_bool().unwrap_or(false),
            Err(e) => {
                warn!("Could not parse tsconfig.json: {}", e);
                false
            }
        }
    }
}

// ==================== Manifest parsers ====================

fn npm_dependencies(text: &str) -> Vec<Dependency> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not parse package.json: {}", e);
            return Vec::new();
        }
    };

    let mut deps = Vec::new();
    for (section, purpose) in [
        ("dependencies", "dependency"),
        ("devDependencies", "dev dependency"),
    ] {
        if let Some(map) = value[section].as_object() {
            for (name, version) in map {
                let version = version.as_str().unwrap_or_default();
                deps.push(Dependency::new(
                    name.as_str(),
                    version.trim_start_matches(['^', '~']),
                    purpose,
                ));
            }
        }
    }
    deps
}

fn pyproject_dependencies(text: &str) -> Vec<Dependency> {
    let value: toml::Value = match toml::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not parse pyproject.toml: {}", e);
            return Vec::new();
        }
    };
    value
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
        .map(|deps| {
            deps.iter()
                .filter_map(|d| d.as_str())
                .filter_map(python_requirement)
                .collect()
        })
        .unwrap_or_default()
}

/// `package>=1.0` style line; comments and blanks are skipped.
fn python_requirement(line: &str) -> Option<Dependency> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
        return None;
    }
    let captures = PY_REQUIREMENT.captures(line)?;
    let version = captures
        .get(2)
        .map(|m| m.as_str().trim_start_matches(['<', '>', '=', '!', '~']).trim())
        .filter(|v| !v.is_empty())
        .unwrap_or("latest");
    Some(Dependency::new(&captures[1], version, "dependency"))
}

fn go_dependencies(text: &str) -> Vec<Dependency> {
    let Some(block) = GO_REQUIRE_BLOCK.captures(text) else {
        return Vec::new();
    };
    block[1]
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(name), Some(version)) => Some(Dependency::new(name, version, "dependency")),
                _ => None,
            }
        })
        .collect()
}

fn cargo_dependencies(text: &str) -> Vec<Dependency> {
    let value: toml::Value = match toml::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not parse Cargo.toml: {}", e);
            return Vec::new();
        }
    };
    let Some(table) = value.get("dependencies").and_then(|d| d.as_table()) else {
        return Vec::new();
    };
    table
        .iter()
        .map(|(name, spec)| {
            let version = match spec {
                toml::Value::String(v) => v.as_str(),
                other => other.get("version").and_then(|v| v.as_str()).unwrap_or("*"),
            };
            Dependency::new(name.as_str(), version, "dependency")
        })
        .collect()
}

// ==================== Directory walking ====================

fn skipped(name: &str) -> bool {
    name.starts_with('.') || name == "node_modules"
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let io_err = |source| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !skipped(file_name(&path)) {
            entries.push(path);
        }
    }
    entries.sort();
    Ok(entries)
}

fn summarize_dir(dir: &Path, depth: usize) -> Result<DirectorySummary, ScanError> {
    let mut summary = DirectorySummary::default();
    if depth > MAX_DEPTH {
        return Ok(summary);
    }
    for path in sorted_entries(dir)? {
        let name = file_name(&path).to_string();
        if path.is_dir() {
            let mut nested = BTreeMap::new();
            nested.insert(name, summarize_dir(&path, depth + 1)?);
            summary.children.push(DirectoryNode::Directory(nested));
        } else if path.is_file() {
            summary.children.push(DirectoryNode::File(name));
        }
    }
    Ok(summary)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ScanError> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_missing_root() {
        let err = CodebaseAnalyzer::new()
            .analyze(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(matches!(err, ScanError::NotFound(_)));
    }

    #[test]
    fn test_typescript_project() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "package.json",
            r#"{"dependencies": {"react": "^18.2.0", "zod": "~3.22.0"}, "devDependencies": {"vitest": "1.0.0"}}"#,
        );
        write(root, "tsconfig.json", r#"{"compilerOptions": {"strict": true}}"#);
        write(root, ".prettierrc", "{}");
        write(root, "src/components/Button.tsx", "");
        write(root, "src/components/Button.test.ts", "");
        write(root, "src/node_modules/x/index.js", "");
        write(root, "services/user.ts", "");

        let analysis = CodebaseAnalyzer::new().analyze(root).unwrap();

        assert_eq!(analysis.package_manager, "npm");
        assert_eq!(analysis.detected_language, "typescript");
        assert_eq!(analysis.detected_framework, "react");
        let react = &analysis.existing_dependencies[0];
        assert_eq!((react.name.as_str(), react.version.as_str()), ("react", "18.2.0"));
        assert_eq!(analysis.existing_dependencies[2].purpose, "dev dependency");

        assert_eq!(
            analysis.constraints,
            vec![
                "Must use typescript",
                "Must be compatible with react framework",
                "Must use npm for dependency management",
                "Must follow strict TypeScript mode",
                "Tests must use vitest",
                "Must pass existing linting rules",
            ]
        );

        let names: Vec<&str> = analysis.patterns.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Service Layer", "Colocated Tests"]);
        assert_eq!(
            analysis.patterns[1].files,
            vec!["src/components/Button.test.ts"]
        );

        let src = &analysis.directory_structure["src"];
        assert_eq!(src.children.len(), 1);
        assert!(!analysis.directory_structure.contains_key("node_modules"));
    }

    #[test]
    fn test_requirements_txt() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "requirements.txt",
            "# web\nFastAPI>=0.110\nuvicorn[standard]==0.29.0\npytest\n",
        );

        let analysis = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();

        assert_eq!(analysis.package_manager, "pip");
        assert_eq!(analysis.detected_language, "python");
        assert_eq!(analysis.detected_framework, "fastapi");
        let versions: Vec<(&str, &str)> = analysis
            .existing_dependencies
            .iter()
            .map(|d| (d.name.as_str(), d.version.as_str()))
            .collect();
        assert_eq!(
            versions,
            vec![("FastAPI", "0.110"), ("uvicorn", "0.29.0"), ("pytest", "latest")]
        );
        assert!(analysis.constraints.contains(&"Tests must use pytest".to_string()));
    }

    #[test]
    fn test_pyproject_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "pyproject.toml",
            "[project]\nname = \"svc\"\ndependencies = [\"django>=5.0\", \"requests\"]\n",
        );

        let analysis = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();
        assert_eq!(analysis.detected_framework, "django");
        assert_eq!(analysis.existing_dependencies.len(), 2);
    }

    #[test]
    fn test_go_module() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "go.mod",
            "module example.com/svc\n\ngo 1.22\n\nrequire (\n\tgithub.com/gin-gonic/gin v1.9.1\n\t// indirect below\n\tgolang.org/x/net v0.20.0 // indirect\n)\n",
        );

        let analysis = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();
        assert_eq!(analysis.package_manager, "go");
        assert_eq!(analysis.detected_framework, "gin");
        assert_eq!(analysis.existing_dependencies.len(), 2);
        assert_eq!(analysis.existing_dependencies[1].version, "v0.20.0");
    }

    #[test]
    fn test_cargo_project() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "Cargo.toml",
            "[package]\nname = \"x\"\n\n[dependencies]\nserde = { version = \"1\", features = [\"derive\"] }\ntokio = \"1.36\"\n",
        );

        let analysis = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();
        assert_eq!(analysis.detected_language, "rust");
        assert_eq!(analysis.detected_framework, "");
        assert!(analysis.has_dependency("serde"));
        assert_eq!(
            analysis.constraints,
            vec!["Must use rust", "Must use cargo for dependency management"]
        );
    }

    #[test]
    fn test_barrel_exports_need_more_than_three() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b", "c"] {
            write(dir.path(), &format!("src/{}/index.ts", sub), "");
        }
        let analysis = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();
        assert!(analysis.patterns.is_empty());

        write(dir.path(), "src/d/index.js", "");
        let analysis = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();
        assert_eq!(analysis.patterns[0].name, "Barrel Exports");
        assert_eq!(analysis.patterns[0].files.len(), 4);
    }

    #[test]
    fn test_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lib/a/b/c/deep.txt", "");

        let analysis = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();
        let lib = &analysis.directory_structure["lib"];
        let DirectoryNode::Directory(a) = &lib.children[0] else {
            panic!("expected directory");
        };
        let DirectoryNode::Directory(b) = &a["a"].children[0] else {
            panic!("expected directory");
        };
        // listed, but not expanded
        assert!(b["b"].children.is_empty());
    }
}

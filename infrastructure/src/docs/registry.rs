//! Package registry documentation fetcher
//!
//! Downloads a package's README from npm or its long description from PyPI,
//! condenses it into `docs/tech/<name>/summary.md` and records registry
//! metadata next to it in `meta.json`.

use planner_application::ports::artifact_store::{ArtifactStore, StoreError};
use planner_application::ports::docs_fetcher::{DocsFetcher, Registry};
use planner_application::use_cases::repository::{
    TECH_DOCS_DIR, tech_docs_dir, tech_docs_summary_path,
};
use async_trait::async_trait;
use planner_domain::truncate_chars;
use regex::Regex;
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info, warn};

const NPM_REGISTRY: &str = "https://registry.npmjs.org";
const PYPI_REGISTRY: &str = "https://pypi.org/pypi";

/// Maximum length of the description paragraph
const DESCRIPTION_CHARS: usize = 1000;

/// Summary sections in priority order, with their accepted headings
const SECTIONS: &[(&str, &str)] = &[
    ("installation", r"(?i)^(install(ation)?|getting\s+started)$"),
    ("quick_start", r"(?i)^(quick\s+start|quickstart)$"),
    ("usage", r"(?i)^(usage|basic\s+usage)$"),
    ("api", r"(?i)^(api|api\s+reference)$"),
    ("configuration", r"(?i)^(config(uration)?|options)$"),
    ("examples", r"(?i)^examples?$"),
];

static SECTION_HEADINGS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    SECTIONS
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(pattern).unwrap()))
        .collect()
});

static FIRST_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:#[^\n]*\n+)?([^\n#]+(?:\n[^\n#]+)*)").unwrap());

/// Limits for fetching and summarising
#[derive(Debug, Clone)]
pub struct DocsSettings {
    pub timeout: Duration,
    pub summary_chars: usize,
    pub section_chars: usize,
    /// Registry for names that do not look like npm packages
    pub default_registry: Registry,
}

impl Default for DocsSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            summary_chars: 8000,
            section_chars: 2000,
            default_registry: Registry::Npm,
        }
    }
}

/// [`DocsFetcher`] backed by the public npm and PyPI registries.
pub struct RegistryDocsFetcher {
    store: Arc<dyn ArtifactStore>,
    http: Client,
    settings: DocsSettings,
}

impl RegistryDocsFetcher {
    pub fn new(store: Arc<dyn ArtifactStore>, settings: DocsSettings) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            store,
            http,
            settings,
        })
    }

    /// Cached summary text for a technology.
    pub fn cached(&self, name: &str) -> Option<String> {
        self.store.read(&tech_docs_summary_path(name)).ok().flatten()
    }

    /// Normalized names with a cached summary, sorted.
    pub fn list_cached(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .store
            .list(TECH_DOCS_DIR)?
            .into_iter()
            .filter(|dir| {
                self.store
                    .exists(&format!("{}/{}/summary.md", TECH_DOCS_DIR, dir))
            })
            .collect())
    }

    /// Remove one technology's cache, or all of them. Returns the number of
    /// cache directories removed.
    pub fn clear(&self, name: Option<&str>) -> Result<usize, StoreError> {
        match name {
            Some(name) => Ok(usize::from(self.store.remove(&tech_docs_dir(name))?)),
            None => {
                let mut cleared = 0;
                for dir in self.store.list(TECH_DOCS_DIR)? {
                    if self.store.remove(&format!("{}/{}", TECH_DOCS_DIR, dir))? {
                        cleared += 1;
                    }
                }
                Ok(cleared)
            }
        }
    }

    async fn fetch_package(&self, name: &str, registry: Registry) -> Result<Value, reqwest::Error> {
        let url = match registry {
            Registry::Npm => format!("{}/{}", NPM_REGISTRY, urlencoding::encode(name)),
            Registry::Pypi => format!("{}/{}/json", PYPI_REGISTRY, urlencoding::encode(name)),
        };
        debug!("GET {}", url);
        self.http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    fn write_cache(&self, name: &str, summary: &str, meta: &Value) -> Result<String, StoreError> {
        let summary_path = tech_docs_summary_path(name);
        self.store.write(&summary_path, summary)?;

        let meta_path = format!("{}/meta.json", tech_docs_dir(name));
        let meta = serde_json::to_string_pretty(meta)
            .map_err(|e| StoreError::serialization(&meta_path, e))?;
        self.store.write(&meta_path, &meta)?;
        Ok(summary_path)
    }
}

#[async_trait]
impl DocsFetcher for RegistryDocsFetcher {
    async fn fetch(&self, name: &str, registry: Registry) -> Option<String> {
        let summary_path = tech_docs_summary_path(name);
        if self.store.exists(&summary_path) {
            debug!("Docs for {} already cached", name);
            return Some(summary_path);
        }

        let package = match self.fetch_package(name, registry).await {
            Ok(package) => package,
            Err(e) => {
                warn!("Could not fetch {} docs for {}: {}", registry, name, e);
                return None;
            }
        };

        let summary = summarize(&package_text(&package, registry), name, &self.settings);
        match self.write_cache(name, &summary, &package_meta(&package, registry)) {
            Ok(path) => {
                info!("Cached {} docs for {} ({} chars)", registry, name, summary.len());
                Some(path)
            }
            Err(e) => {
                warn!("Could not cache docs for {}: {}", name, e);
                None
            }
        }
    }

    async fn fetch_many(&self, names: &[String]) -> Vec<String> {
        let mut cached = Vec::new();
        for name in names {
            let registry = registry_for(name, self.settings.default_registry);
            if self.fetch(name, registry).await.is_some() {
                cached.push(name.clone());
            }
        }
        cached
    }
}

/// Scoped or hyphenated names are npm packages; others use the default.
pub fn registry_for(name: &str, default: Registry) -> Registry {
    if name.starts_with('@') || name.contains('-') {
        Registry::Npm
    } else {
        default
    }
}

fn package_text(package: &Value, registry: Registry) -> String {
    let text = match registry {
        Registry::Npm => &package["readme"],
        Registry::Pypi => &package["info"]["description"],
    };
    text.as_str().unwrap_or_default().to_string()
}

fn package_meta(package: &Value, registry: Registry) -> Value {
    let field = |v: &Value| v.as_str().unwrap_or_default().to_string();
    match registry {
        Registry::Npm => json!({
            "name": field(&package["name"]),
            "version": field(&package["dist-tags"]["latest"]),
            "description": field(&package["description"]),
            "homepage": field(&package["homepage"]),
            "repository": field(&package["repository"]["url"]),
            "license": field(&package["license"]),
            "registry": "npm",
        }),
        Registry::Pypi => {
            let info = &package["info"];
            json!({
                "name": field(&info["name"]),
                "version": field(&info["version"]),
                "description": field(&info["summary"]),
                "homepage": field(&info["home_page"]),
                "repository": field(&info["project_urls"]["Repository"]),
                "license": field(&info["license"]),
                "registry": "pypi",
            })
        }
    }
}

/// Condense raw documentation into a bounded markdown summary.
///
/// The title comes first, then the description paragraph, then the known
/// sections in priority order until `summary_chars` is spent.
pub fn summarize(content: &str, name: &str, settings: &DocsSettings) -> String {
    let title = format!("# {}\n", name);
    if content.trim().is_empty() {
        return format!("{}\nNo documentation available.", title);
    }

    let mut parts = vec![title.clone()];
    let mut remaining = settings.summary_chars.saturating_sub(title.chars().count());

    for (_, section) in key_sections(content, settings.section_chars) {
        if remaining == 0 {
            break;
        }
        let part = if section.chars().count() > remaining {
            format!("{}...", truncate_chars(&section, remaining))
        } else {
            section
        };
        remaining = remaining.saturating_sub(part.chars().count());
        parts.push(part);
    }

    parts.join("\n\n")
}

/// Description plus recognised sections, in priority order.
fn key_sections(content: &str, section_chars: usize) -> Vec<(&'static str, String)> {
    let mut sections = Vec::new();

    if let Some(captures) = FIRST_PARAGRAPH.captures(content) {
        let description = captures[1].trim();
        if !description.is_empty() {
            sections.push((
                "description",
                truncate_chars(description, DESCRIPTION_CHARS).to_string(),
            ));
        }
    }

    for (name, heading) in SECTION_HEADINGS.iter() {
        if let Some(body) = section_body(content, heading) {
            sections.push((*name, truncate_chars(&body, section_chars).to_string()));
        }
    }

    sections
}

/// Body under the first heading matching `heading`, up to the next `##`.
fn section_body(content: &str, heading: &Regex) -> Option<String> {
    let mut lines = content.lines();
    lines.find(|line| {
        line.starts_with('#') && heading.is_match(line.trim_start_matches('#').trim())
    })?;

    let body: Vec<&str> = lines.take_while(|line| !line.starts_with("##")).collect();
    let body = body.join("\n").trim().to_string();
    (!body.is_empty()).then_some(body)
}

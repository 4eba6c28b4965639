//! Built-in providers and model keys, with config overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provider used for model keys the catalog does not know
pub const FALLBACK_PROVIDER: &str = "anthropic";

pub const DEFAULT_API_VERSION: &str = "2023-06-01";

const DEFAULT_MAX_TOKENS: u32 = 8192;

/// How a provider is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Anthropic-compatible Messages API over HTTP
    #[default]
    Api,
    /// The `claude` command-line tool
    ClaudeCli,
}

/// `[providers.<name>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    /// API base URL; the Anthropic endpoint when absent
    pub base_url: Option<String>,
    /// Env var holding the API key; `ANTHROPIC_API_KEY` is the fallback
    pub api_key_env: Option<String>,
    /// `CLAUDE_CONFIG_DIR` for CLI providers (`~` is expanded)
    pub config_dir: Option<String>,
    pub api_version: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Api,
            base_url: None,
            api_key_env: None,
            config_dir: None,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl ProviderSettings {
    fn api(base_url: Option<&str>, api_key_env: &str) -> Self {
        Self {
            base_url: base_url.map(str::to_string),
            api_key_env: Some(api_key_env.to_string()),
            ..Default::default()
        }
    }

    fn cli(config_dir: Option<&str>) -> Self {
        Self {
            kind: ProviderKind::ClaudeCli,
            config_dir: config_dir.map(str::to_string),
            ..Default::default()
        }
    }
}

/// `[models.<key>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model id sent to the provider
    pub id: String,
    pub provider: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl ModelSettings {
    fn new(id: &str, provider: &str, max_tokens: u32) -> Self {
        Self {
            id: id.to_string(),
            provider: provider.to_string(),
            max_tokens,
        }
    }
}

/// Lookup table from model keys and provider names to their settings.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    providers: BTreeMap<String, ProviderSettings>,
    models: BTreeMap<String, ModelSettings>,
}

impl ModelCatalog {
    pub fn builtin() -> Self {
        let providers = [
            ("anthropic", ProviderSettings::api(None, "ANTHROPIC_API_KEY")),
            (
                "zai",
                ProviderSettings::api(Some("https://api.z.ai/api/anthropic"), "ZAI_API_KEY"),
            ),
            (
                "minimax",
                ProviderSettings::api(Some("https://api.minimax.io/anthropic"), "MINIMAX_API_KEY"),
            ),
            ("claude-cli", ProviderSettings::cli(None)),
            ("claude-cli-glm", ProviderSettings::cli(Some("~/.glm"))),
            ("claude-cli-minimax", ProviderSettings::cli(Some("~/.minimax"))),
        ];

        let models = [
            ("sonnet", ModelSettings::new("claude-sonnet-4-20250514", "anthropic", 8192)),
            ("haiku", ModelSettings::new("claude-haiku-4-20250514", "anthropic", 8192)),
            ("opus", ModelSettings::new("claude-opus-4-20250514", "anthropic", 8192)),
            ("glm-4.7", ModelSettings::new("glm-4.7", "zai", 16384)),
            ("glm-4.6", ModelSettings::new("glm-4.6", "zai", 16384)),
            ("minimax-m1", ModelSettings::new("MiniMax-M1", "minimax", 16384)),
            ("minimax-m2.1", ModelSettings::new("MiniMax-M2.1", "minimax", 16384)),
            ("claude", ModelSettings::new("claude", "claude-cli", 16384)),
            ("claude-glm", ModelSettings::new("claude", "claude-cli-glm", 16384)),
            ("claude-minimax", ModelSettings::new("claude", "claude-cli-minimax", 16384)),
        ];

        Self {
            providers: providers
                .into_iter()
                .map(|(name, settings)| (name.to_string(), settings))
                .collect(),
            models: models
                .into_iter()
                .map(|(key, settings)| (key.to_string(), settings))
                .collect(),
        }
    }

    /// Built-in entries replaced or extended by configured ones.
    pub fn with_overrides(
        providers: &BTreeMap<String, ProviderSettings>,
        models: &BTreeMap<String, ModelSettings>,
    ) -> Self {
        let mut catalog = Self::builtin();
        catalog
            .providers
            .extend(providers.iter().map(|(k, v)| (k.clone(), v.clone())));
        catalog
            .models
            .extend(models.iter().map(|(k, v)| (k.clone(), v.clone())));
        catalog
    }

    /// Settings for a model key. Unknown keys are taken as raw model ids
    /// for the fallback provider.
    pub fn resolve(&self, key: &str) -> ModelSettings {
        self.models
            .get(key)
            .cloned()
            .unwrap_or_else(|| ModelSettings::new(key, FALLBACK_PROVIDER, DEFAULT_MAX_TOKENS))
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers.get(name)
    }

    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn model_keys(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn models(&self) -> impl Iterator<Item = (&str, &ModelSettings)> {
        self.models.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keys() {
        let catalog = ModelCatalog::builtin();

        let sonnet = catalog.resolve("sonnet");
        assert_eq!(sonnet.id, "claude-sonnet-4-20250514");
        assert_eq!(sonnet.provider, "anthropic");
        assert_eq!(sonnet.max_tokens, 8192);

        let glm = catalog.resolve("claude-glm");
        assert_eq!(glm.provider, "claude-cli-glm");
        assert_eq!(
            catalog.provider("claude-cli-glm").unwrap().config_dir.as_deref(),
            Some("~/.glm")
        );
        assert_eq!(catalog.provider("zai").unwrap().kind, ProviderKind::Api);
    }

    #[test]
    fn test_unknown_key_is_raw_id() {
        let catalog = ModelCatalog::builtin();
        let model = catalog.resolve("claude-3-5-haiku-latest");
        assert_eq!(model.id, "claude-3-5-haiku-latest");
        assert_eq!(model.provider, FALLBACK_PROVIDER);
    }

    #[test]
    fn test_overrides() {
        let providers = BTreeMap::from([(
            "local".to_string(),
            ProviderSettings {
                base_url: Some("http://localhost:8080".to_string()),
                ..Default::default()
            },
        )]);
        let models = BTreeMap::from([
            ("sonnet".to_string(), ModelSettings::new("claude-sonnet-4-5", "anthropic", 4096)),
            ("local".to_string(), ModelSettings::new("qwen", "local", 2048)),
        ]);

        let catalog = ModelCatalog::with_overrides(&providers, &models);
        assert_eq!(catalog.resolve("sonnet").id, "claude-sonnet-4-5");
        assert_eq!(catalog.resolve("local").provider, "local");
        assert!(catalog.has_provider("local"));
        assert!(catalog.has_provider("minimax"));
        assert!(catalog.model_keys().any(|k| k == "opus"));
    }

    #[test]
    fn test_provider_settings_from_toml() {
        let settings: ProviderSettings =
            toml::from_str("kind = \"claude_cli\"\nconfig_dir = \"~/.work\"\n").unwrap();
        assert_eq!(settings.kind, ProviderKind::ClaudeCli);
        assert_eq!(settings.api_version, DEFAULT_API_VERSION);

        let model: ModelSettings = toml::from_str("id = \"glm-5\"\nprovider = \"zai\"\n").unwrap();
        assert_eq!(model.max_tokens, 8192);
    }
}

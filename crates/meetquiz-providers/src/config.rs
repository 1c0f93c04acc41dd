//! Configuration loading and the provider/generator factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use meetquiz_core::engine::EngineConfig;
use meetquiz_core::traits::{ContentGenerator, LlmProvider};

use crate::generator::{GenerationSettings, LlmContentGenerator};
use crate::mock::MockProvider;
use crate::openai::{OpenAiCompatibleProvider, OPENAI_BASE_URL, OPENROUTER_BASE_URL};

/// Configuration for a single LLM provider.
///
/// Debug output masks API keys.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenRouter {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    /// Canned offline answers.
    Mock,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenRouter {
                api_key: _,
                base_url,
            } => f
                .debug_struct("OpenRouter")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Mock => f.write_str("Mock"),
        }
    }
}

/// Top-level meetquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetquizConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Upper bound for one generator call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// JSON snapshot the CLI reads and writes.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

fn default_provider() -> String {
    "openrouter".to_string()
}
fn default_model() -> String {
    "openai/gpt-oss-20b:free".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_state_path() -> PathBuf {
    PathBuf::from("meetquiz-state.json")
}

impl Default for MeetquizConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            state_path: default_state_path(),
        }
    }
}

impl MeetquizConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            generator_timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            model: self.default_model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenRouter { api_key, base_url } => ProviderConfig::OpenRouter {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        ProviderConfig::Mock => ProviderConfig::Mock,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `meetquiz.toml` in the current directory
/// 2. `~/.config/meetquiz/config.toml`
///
/// Environment variable overrides: `OPENROUTER_API_KEY`, `MEETQUIZ_OPENAI_KEY`.
pub fn load_config() -> Result<MeetquizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<MeetquizConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("meetquiz.toml");
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MeetquizConfig::default(),
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

fn parse_config(content: &str) -> Result<MeetquizConfig> {
    let mut config: MeetquizConfig = toml::from_str(content)?;
    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    Ok(config)
}

fn apply_env_overrides(config: &mut MeetquizConfig) {
    if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
        match config.providers.get_mut("openrouter") {
            Some(ProviderConfig::OpenRouter { api_key, .. }) => *api_key = key,
            _ => {
                config.providers.insert(
                    "openrouter".into(),
                    ProviderConfig::OpenRouter {
                        api_key: key,
                        base_url: None,
                    },
                );
            }
        }
    }

    if let Ok(key) = std::env::var("MEETQUIZ_OPENAI_KEY") {
        match config.providers.get_mut("openai") {
            Some(ProviderConfig::OpenAI { api_key, .. }) => *api_key = key,
            _ => {
                config.providers.insert(
                    "openai".into(),
                    ProviderConfig::OpenAI {
                        api_key: key,
                        base_url: None,
                        org_id: None,
                    },
                );
            }
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("meetquiz"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(
    name: &str,
    config: &ProviderConfig,
    timeout_secs: u64,
) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match config {
        ProviderConfig::OpenRouter { api_key, base_url } => {
            ensure_key(name, api_key)?;
            Arc::new(OpenAiCompatibleProvider::new(
                name,
                api_key,
                base_url
                    .clone()
                    .unwrap_or_else(|| OPENROUTER_BASE_URL.to_string()),
                None,
                timeout_secs,
            )?)
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => {
            ensure_key(name, api_key)?;
            Arc::new(OpenAiCompatibleProvider::new(
                name,
                api_key,
                base_url.clone().unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
                org_id.clone(),
                timeout_secs,
            )?)
        }
        ProviderConfig::Mock => Arc::new(MockProvider::canned()),
    };
    Ok(provider)
}

fn ensure_key(name: &str, api_key: &str) -> Result<()> {
    if api_key.trim().is_empty() {
        anyhow::bail!("provider '{name}' has no API key (set it in the config or via environment)");
    }
    Ok(())
}

/// Build the engine's content generator from the default provider.
pub fn create_generator(config: &MeetquizConfig) -> Result<Arc<dyn ContentGenerator>> {
    let provider_config = config
        .providers
        .get(&config.default_provider)
        .with_context(|| {
            format!(
                "default provider '{}' is not configured (set OPENROUTER_API_KEY or add [providers.{}] to meetquiz.toml)",
                config.default_provider, config.default_provider
            )
        })?;

    let provider = create_provider(
        &config.default_provider,
        provider_config,
        config.timeout_secs,
    )?;
    tracing::debug!(
        provider = provider.name(),
        model = %config.default_model,
        "content generator ready"
    );
    Ok(Arc::new(LlmContentGenerator::new(
        provider,
        config.generation_settings(),
    )))
}

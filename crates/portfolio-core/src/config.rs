use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::client::Replies;
use crate::profile::Profile;
use crate::provider::Provider;

/// What the chat does when no API key is available.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DegradedMode {
    /// Answer every question with the "not configured" placeholder.
    #[default]
    Placeholder,
    /// Answer with a canned demo reply after a short delay.
    Demo,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    pub degraded: DegradedMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<PathBuf>,
    pub replies: Replies,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the config file, then let environment variables override its keys.
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(&Self::get_config_path()?)?.with_env(|name| std::env::var(name).ok()))
    }

    /// Load a config file. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Persist a model choice without writing environment-supplied keys to disk.
    pub fn save_default_model(model: &str) -> Result<()> {
        Self::save_model_to(&Self::get_config_path()?, model)
    }

    /// Rewrite the `model` field of the file at `path`. A file that fails to
    /// parse is left untouched and the parse error is returned.
    pub fn save_model_to(path: &Path, model: &str) -> Result<()> {
        let mut config = Self::load_from(path)?;
        config.model = Some(model.to_string());
        config.save_to(path)
    }

    /// Overlay API keys found through `lookup` (normally `std::env::var`).
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for provider in Provider::all() {
            let Some(key) = lookup(provider.key_env_var()).filter(|k| !k.trim().is_empty()) else {
                continue;
            };
            match provider {
                Provider::Gemini => self.gemini_api_key = Some(key),
                Provider::OpenAI => self.openai_api_key = Some(key),
            }
        }
        self
    }

    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::Gemini => self.gemini_api_key.as_deref(),
            Provider::OpenAI => self.openai_api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }

    /// The provider to talk to and its key.
    ///
    /// A provider named in the config is used only if it has a key. With no
    /// name, the first provider holding a key wins.
    pub fn resolve_provider(&self) -> Option<(Provider, String)> {
        if let Some(name) = &self.provider {
            let Some(provider) = Provider::from_str(name) else {
                tracing::warn!(provider = %name, "Unknown provider in config");
                return None;
            };
            return self.api_key(provider).map(|key| (provider, key.to_string()));
        }

        Provider::all()
            .into_iter()
            .find_map(|provider| self.api_key(provider).map(|key| (provider, key.to_string())))
    }

    /// The configured model when it belongs to `provider`, else its default.
    pub fn model_for(&self, provider: Provider) -> String {
        let explicit = self.provider.as_deref().and_then(Provider::from_str) == Some(provider);
        match &self.model {
            Some(model) if explicit || provider.list_models().contains(model) => model.clone(),
            _ => provider.default_model().to_string(),
        }
    }

    /// The profile to present: the file named by `profile_path`, or the built-in one.
    pub fn load_profile(&self) -> Result<Profile> {
        match &self.profile_path {
            Some(path) => Profile::load(path),
            None => Ok(Profile::builtin().clone()),
        }
    }

    /// A copy safe to print, with API keys masked.
    pub fn redacted(&self) -> Self {
        let mask = |key: &Option<String>| key.as_ref().map(|_| "********".to_string());
        Self {
            gemini_api_key: mask(&self.gemini_api_key),
            openai_api_key: mask(&self.openai_api_key),
            ..self.clone()
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("portfolio").join("config.json"))
    }
}

//! Application configuration loaded from an optional `mirror.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Top-level configuration (TOML).
///
/// Every field has a default so a missing file, or a file that sets only a
/// few keys, still yields a usable config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MirrorConfig {
    /// Location of the journal CSV.
    pub store_path: PathBuf,

    pub reflection: ReflectionConfig,
}

/// Settings for the chat-completions collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReflectionConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    pub base_url: String,

    pub model: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    /// Request timeout in seconds. Expiry is reported as a reflection failure.
    pub timeout_secs: u64,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("journal_entries.csv"),
            reflection: ReflectionConfig::default(),
        }
    }
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ReflectionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl MirrorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.store_path.as_os_str().is_empty() {
            return Err(anyhow!("store_path must not be empty"));
        }
        let reflection = &self.reflection;
        if reflection.timeout_secs == 0 {
            return Err(anyhow!("reflection.timeout_secs must be > 0"));
        }
        if reflection.base_url.trim().is_empty() {
            return Err(anyhow!("reflection.base_url must not be empty"));
        }
        if reflection.model.trim().is_empty() {
            return Err(anyhow!("reflection.model must not be empty"));
        }
        if reflection.api_key_env.trim().is_empty() {
            return Err(anyhow!("reflection.api_key_env must not be empty"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `MirrorConfig::default()`.
pub fn load_config(path: &Path) -> Result<MirrorConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config file missing, using defaults");
        let cfg = MirrorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: MirrorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Read the API key from the process environment.
///
/// Fails fast with a message naming the variable so a missing credential is
/// caught at startup rather than on the first reflection.
pub fn resolve_api_key(cfg: &ReflectionConfig) -> Result<String> {
    resolve_api_key_with(cfg, |name| std::env::var(name).ok())
}

/// Like [`resolve_api_key`], reading variables through `lookup`.
pub fn resolve_api_key_with<F>(cfg: &ReflectionConfig, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(&cfg.api_key_env) {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(anyhow!(
            "missing credential: set the {} environment variable to your API key",
            cfg.api_key_env
        )),
    }
}

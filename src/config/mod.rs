// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{LabelError, Result};
use config::{Config, Environment, File, Map};
use std::path::{Path, PathBuf};

/// Environment variable consulted when no key is configured elsewhere.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest, `LABEL_HELPER_` prefix, `__` between sections)
    /// 2. Config file (`--config` or `~/.label-helper/config.toml`)
    /// 3. Defaults (lowest)
    ///
    /// The Gemini key falls back to `GEMINI_API_KEY` and must be present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, None)
    }

    /// Same as [`AppConfig::load`], reading variables from `env` instead of
    /// the process environment.
    pub fn load_with_env(path: Option<&Path>, env: Map<String, String>) -> Result<Self> {
        Self::load_from(path, Some(env))
    }

    fn load_from(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let fallback_key = match &env {
            Some(vars) => vars.get(API_KEY_ENV).cloned(),
            None => std::env::var(API_KEY_ENV).ok(),
        };

        let mut config = Self::load_layers(path, env)?;

        if config.gemini.api_key.is_empty() {
            if let Some(key) = fallback_key {
                config.gemini.api_key = ApiKey::new(key);
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn load_layers(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let file_source = match path {
            // An explicitly named file has to exist
            Some(p) => File::from(p.to_path_buf()).required(true),
            None => File::from(Self::default_config_path()).required(false),
        };

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("LABEL_HELPER")
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(|e| LabelError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| LabelError::Config(e.to_string()))
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.gemini.api_key.is_empty() {
            return Err(LabelError::Config(format!(
                "missing Gemini API key (set gemini.api_key or {})",
                API_KEY_ENV
            )));
        }
        if !(1..=100).contains(&self.pipeline.jpeg_quality) {
            return Err(LabelError::Config(format!(
                "pipeline.jpeg_quality must be within 1..=100, got {}",
                self.pipeline.jpeg_quality
            )));
        }
        if self.pipeline.max_dimension == Some(0) {
            return Err(LabelError::Config(
                "pipeline.max_dimension must be positive".to_string(),
            ));
        }
        if self.speech.max_chunk_chars == 0 {
            return Err(LabelError::Config(
                "speech.max_chunk_chars must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".label-helper")
            .join("config.toml")
    }
}

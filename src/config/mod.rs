//! Configuration management for Turnkeep
//!
//! Configuration is loaded from `~/.turnkeep/config.json` with environment
//! variable overrides. A missing file means defaults.

mod types;

pub use types::*;

use std::path::{Path, PathBuf};

use crate::error::{Result, TurnError};

impl Config {
    /// Returns the Turnkeep configuration directory path (~/.turnkeep)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".turnkeep")
    }

    /// Returns the path to the config file (~/.turnkeep/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides from the process environment.
    ///
    /// Variables follow the pattern `TURNKEEP_SECTION_KEY`; `OPENAI_API_KEY`
    /// is honoured when no key is configured otherwise.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Agent
        if let Some(val) = lookup("TURNKEEP_AGENT_MODEL") {
            self.agent.model = val;
        }
        if let Some(val) = lookup("TURNKEEP_AGENT_INSTRUCTIONS") {
            self.agent.instructions = val;
        }
        if let Some(val) = lookup("TURNKEEP_AGENT_TOKEN_BUDGET") {
            match val.parse() {
                Ok(v) => self.agent.token_budget = v,
                Err(_) => tracing::warn!(value = %val, "Ignoring invalid TURNKEEP_AGENT_TOKEN_BUDGET"),
            }
        }
        if let Some(val) = lookup("TURNKEEP_AGENT_TOOL_CHOICE") {
            match val.parse() {
                Ok(v) => self.agent.tool_choice = v,
                Err(_) => tracing::warn!(value = %val, "Ignoring invalid TURNKEEP_AGENT_TOOL_CHOICE"),
            }
        }

        // Provider
        if let Some(val) = lookup("TURNKEEP_PROVIDER_API_KEY") {
            self.provider.api_key = Some(val);
        } else if self.provider.api_key.is_none() {
            if let Some(val) = lookup("OPENAI_API_KEY") {
                self.provider.api_key = Some(val);
            }
        }
        if let Some(val) = lookup("TURNKEEP_PROVIDER_API_BASE") {
            self.provider.api_base = Some(val);
        }

        // Logging
        if let Some(val) = lookup("TURNKEEP_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Check the settings every turn depends on.
    pub fn validate(&self) -> Result<()> {
        if self.agent.token_budget == 0 {
            return Err(TurnError::Config(
                "agent.token_budget must be positive".into(),
            ));
        }
        if self.agent.model.trim().is_empty() {
            return Err(TurnError::Config("agent.model must not be empty".into()));
        }
        Ok(())
    }

    /// The configured API key, or a configuration error naming the variables to set.
    pub fn api_key(&self) -> Result<&str> {
        self.provider
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                TurnError::Config(
                    "no API key configured (set TURNKEEP_PROVIDER_API_KEY or OPENAI_API_KEY)"
                        .into(),
                )
            })
    }

    /// Copy of this config with the API key masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.provider.api_key.is_some() {
            copy.provider.api_key = Some("********".to_string());
        }
        copy
    }
}

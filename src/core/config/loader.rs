#![allow(clippy::result_large_err)]

use super::EngineConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

/// File name looked up inside a configuration directory.
pub const CONFIG_FILE_NAME: &str = "wizard-engine.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from `dir/wizard-engine.toml`.
    /// Environment variables override config file values; a missing file
    /// yields defaults plus environment overrides.
    pub fn load_from_dir(dir: &Path) -> Result<EngineConfig, AppError> {
        let config_file = Self::load_from_file(&dir.join(CONFIG_FILE_NAME))?;
        let mut config = config_file.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load config from specific file path.
    /// Returns Ok(None) if file doesn't exist.
    pub fn load_from_file(path: &Path) -> Result<Option<EngineConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
            .with_code("WIZ-CFG-001")
        })?;

        let config: EngineConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("WIZ-CFG-002")
        })?;

        Ok(Some(config))
    }

    fn apply_env_overrides(config: &mut EngineConfig) {
        if let Ok(dir) = env::var("WIZARD_ENGINE_WIZARDS_DIR") {
            config.store.wizards_dir = PathBuf::from(dir);
        }

        if let Ok(level) = env::var("WIZARD_ENGINE_LOG_LEVEL") {
            config.logging.default_level = level;
        }

        if let Ok(user_agent) = env::var("WIZARD_ENGINE_USER_AGENT") {
            config.remote.user_agent = user_agent;
        }

        if let Ok(json_str) = env::var("WIZARD_ENGINE_LOG_JSON") {
            if let Ok(json) = json_str.parse::<bool>() {
                config.logging.json = json;
            }
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "WIZARD_ENGINE_WIZARDS_DIR - Override the wizard store directory (default: wizards)",
            "WIZARD_ENGINE_LOG_LEVEL - Override the default tracing directive (default: info)",
            "WIZARD_ENGINE_USER_AGENT - Override the User-Agent sent with remote actions",
            "WIZARD_ENGINE_LOG_JSON - Emit console logs as JSON lines (true/false)",
        ]
    }
}

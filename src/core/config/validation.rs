#![allow(clippy::result_large_err)]

use super::EngineConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &EngineConfig) -> Result<(), AppError> {
        if config.store.wizards_dir.as_os_str().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "store.wizards_dir cannot be empty",
            )
            .with_code("WIZ-CFG-003"));
        }

        if config.remote.user_agent.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "remote.user_agent cannot be empty",
            )
            .with_code("WIZ-CFG-003"));
        }

        config.logging.validate().map_err(|err| {
            AppError::new(ErrorCategory::ValidationError, err.to_string()).with_code("WIZ-CFG-003")
        })?;

        Ok(())
    }
}

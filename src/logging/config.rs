use crate::logging::layers::console::ConsoleOutput;
use crate::Result;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing_subscriber::filter::Directive;

const DEFAULT_LEVEL: &str = "info";

/// Logging settings, read from the `[logging]` section of the engine config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub default_level: String,
    pub console_output: ConsoleOutput,
    /// Emit console records as JSON lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_level: DEFAULT_LEVEL.to_string(),
            console_output: ConsoleOutput::default(),
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        Directive::from_str(&self.default_level)
            .map_err(|_| anyhow!("logging.default_level must be a valid tracing directive"))?;
        Ok(())
    }
}

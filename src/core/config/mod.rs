use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine configuration loaded from wizard-engine.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineConfig {
    /// Wizard document storage
    #[serde(default)]
    pub store: StoreConfig,

    /// Outbound HTTP settings for remote actions
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Wizard store configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Directory holding one `<name>.json` file per wizard
    #[serde(default = "default_wizards_dir")]
    pub wizards_dir: PathBuf,
}

/// Remote action transport configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteConfig {
    /// User-Agent header sent with every remote call
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_wizards_dir() -> PathBuf {
    PathBuf::from("wizards")
}

fn default_user_agent() -> String {
    concat!("wizard-engine/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            wizards_dir: default_wizards_dir(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            user_agent: default_user_agent(),
        }
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;

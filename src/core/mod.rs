pub mod config;
pub mod error;
pub mod types;
pub mod wizard;

pub use config::{ConfigLoader, ConfigValidator, EngineConfig, RemoteConfig, StoreConfig};
pub use error::AppError;
pub use types::*;
pub use wizard::{ActionResult, EvaluationState, WizardEngine};

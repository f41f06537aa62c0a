//! Interpreter for declarative multi-step form wizards.
//!
//! Documents are modelled in the `wizard-types` crate; this crate resolves
//! their contexts, evaluates conditions and executes event blocks.

pub mod core;
pub mod logging;

pub use wizard_types as types;

/// Current crate version string exposed for embedding hosts and tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub type Result<T> = std::result::Result<T, anyhow::Error>;

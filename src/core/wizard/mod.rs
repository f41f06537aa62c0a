//! Runtime interpreter for wizard documents.
//!
//! [`WizardEngine`] resolves contexts, evaluates conditions and runs action
//! blocks against a caller-owned [`EvaluationState`]. Remote calls go through a
//! pluggable [`RemoteTransport`].

#![allow(clippy::result_large_err)]

pub mod action;
pub mod block;
pub mod condition;
pub mod context;
pub mod expression;
pub mod remote;
pub mod schema;
pub mod state;
pub mod store;
pub mod template;
pub mod values;

pub use action::ActionResult;
pub use expression::QueryEngine;
pub use remote::{
    RemoteReply, RemoteRequest, RemoteResponse, RemoteTransport, ReqwestTransport, RequestBody,
    TransportError,
};
pub use schema::{load_wizard, parse_wizard, validate_wizard};
pub use state::{EvaluationState, ForEachFrame};
pub use store::{FileWizardStore, MemoryWizardStore, WizardStore};
pub use template::TemplateEngine;

use crate::core::config::RemoteConfig;
use crate::core::error::AppError;
use serde_json::{Map, Value};
use std::sync::Arc;
use wizard_types::Wizard;

/// Interpreter facade shared by every resolver.
///
/// Holds no per-session data, so one instance can serve many sessions
/// concurrently as long as each session brings its own state.
pub struct WizardEngine {
    query: QueryEngine,
    templates: TemplateEngine,
    transport: Arc<dyn RemoteTransport>,
}

impl Default for WizardEngine {
    fn default() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::default()))
    }
}

impl WizardEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose HTTP client uses the configured user agent.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, AppError> {
        let transport = ReqwestTransport::new(&config.user_agent)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn RemoteTransport>) -> Self {
        Self {
            query: QueryEngine::default(),
            templates: TemplateEngine::default(),
            transport,
        }
    }

    pub fn evaluate_query(
        &self,
        expr: &str,
        data: &Value,
        bindings: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        self.query.evaluate(expr, data, bindings)
    }

    pub fn render_template(
        &self,
        template: &str,
        data: &Map<String, Value>,
    ) -> Result<String, AppError> {
        self.templates.render(template, data)
    }

    pub fn validate(&self, wizard: &Wizard) -> Result<(), AppError> {
        validate_wizard(wizard, &self.query)
    }
}

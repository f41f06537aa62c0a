#![allow(clippy::result_large_err)]

use super::state::EvaluationState;
use super::values::display_string;
use super::WizardEngine;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use wizard_types::{Action, ActionType, Context, StepTarget, Wizard};

/// Record produced for every executed action.
///
/// Failed actions carry `error` and no payload; the block executor keeps going.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn success(action_type: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            action_type: action_type.into(),
            payload,
            error: None,
        }
    }

    pub fn failure(action_type: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

fn required(field: &str, kind: &ActionType) -> AppError {
    AppError::new(
        ErrorCategory::ValidationError,
        format!("{} required for {}", field, kind),
    )
    .with_code("WIZ-ACT-001")
}

fn require<'a>(field: &'a Option<String>, name: &str, kind: &ActionType) -> Result<&'a str, AppError> {
    field
        .as_deref()
        .filter(|text| !text.is_empty())
        .ok_or_else(|| required(name, kind))
}

impl WizardEngine {
    /// Execute one action. Never fails: errors become a result record with `error` set.
    pub async fn execute_action(
        &self,
        action: &Action,
        state: &mut EvaluationState,
        wizard: &Wizard,
    ) -> ActionResult {
        debug!(action_type = %action.action_type, order = action.order, "executing action");
        match self.perform_action(action, state, wizard).await {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    action_type = %action.action_type,
                    code = %err.code,
                    error = %err.message,
                    "action failed"
                );
                ActionResult::failure(action.action_type.as_str(), err.message)
            }
        }
    }

    async fn perform_action(
        &self,
        action: &Action,
        state: &mut EvaluationState,
        wizard: &Wizard,
    ) -> Result<ActionResult, AppError> {
        let kind = &action.action_type;
        let payload = match kind {
            ActionType::GoToStep => {
                let step_name = match &action.step_name {
                    Some(StepTarget::Name(name)) => name.clone(),
                    Some(StepTarget::Context(context)) => {
                        display_string(&self.resolve_context(context, state, wizard).await?)
                    }
                    None => return Err(required("stepName", kind)),
                };
                // A null or blank target is not a step name.
                if step_name.trim().is_empty() {
                    return Err(required("stepName", kind));
                }
                Some(json!({ "stepName": step_name }))
            }

            ActionType::SaveStepValues => Some(json!({ "values": state.current_step_values })),

            ActionType::InitStepValues | ActionType::ConfirmLeavePage => None,

            ActionType::FinishWizard => Some(json!({ "allValues": state.all_step_values })),

            ActionType::UpdateComponent => {
                let target = require(&action.target_name, "targetName", kind)?;
                let prop = require(&action.target_prop, "targetProp", kind)?;
                let target_name = self
                    .render_with(target, &action.target_contexts, state, wizard)
                    .await?;
                let value = self.action_value(action, state, wizard).await?;
                Some(json!({ "targetName": target_name, "targetProp": prop, "value": value }))
            }

            ActionType::SetValue => {
                let target = require(&action.target_name, "targetName", kind)?;
                let target_name = self
                    .render_with(target, &action.target_contexts, state, wizard)
                    .await?;
                let value = self.action_value(action, state, wizard).await?;
                Some(json!({ "targetName": target_name, "value": value }))
            }

            ActionType::AddError => {
                let field = require(&action.field_name, "fieldName", kind)?;
                let field_name = self
                    .render_with(field, &action.field_contexts, state, wizard)
                    .await?;
                let message = action.error_message.as_deref().unwrap_or("Validation error");
                let error_message = self
                    .render_with(message, &action.contexts, state, wizard)
                    .await?;
                Some(json!({ "fieldName": field_name, "errorMessage": error_message }))
            }

            ActionType::ClearErrors => {
                let field = require(&action.field_name, "fieldName", kind)?;
                let field_name = self
                    .render_with(field, &action.field_contexts, state, wizard)
                    .await?;
                Some(json!({ "fieldName": field_name }))
            }

            ActionType::ConsoleLog => {
                let message = self
                    .render_with(
                        action.message.as_deref().unwrap_or_default(),
                        &action.contexts,
                        state,
                        wizard,
                    )
                    .await?;
                info!(target: "wizard_log", "{}", message);
                Some(json!({ "message": message }))
            }

            ActionType::RemoteUpdateComponent => {
                let target = require(&action.target_name, "targetName", kind)?;
                let prop = require(&action.target_prop, "targetProp", kind)?;
                let name = require(&action.name, "name", kind)?;
                if wizard.remote_action(name).is_none() {
                    return Err(AppError::new(
                        ErrorCategory::NotFoundError,
                        format!("Remote action '{}' not found", name),
                    )
                    .with_code("WIZ-ACT-002"));
                }
                Some(json!({ "targetName": target, "targetProp": prop, "actionName": name }))
            }

            ActionType::AddGroup => {
                let group = require(&action.group_name, "groupName", kind)?;
                Some(json!({ "groupName": group }))
            }

            ActionType::RemoveGroup => {
                let group = require(&action.group_name, "groupName", kind)?;
                let mut payload = json!({ "groupName": group });
                if let Some(context) = &action.group_index {
                    payload["groupIndex"] = self.resolve_context(context, state, wizard).await?;
                }
                Some(payload)
            }

            ActionType::TakePhoto => {
                let field = require(&action.field_name, "fieldName", kind)?;
                Some(json!({ "fieldName": field }))
            }

            ActionType::KillTask => {
                let task = require(&action.name, "name", kind)?;
                Some(json!({ "taskName": task }))
            }

            ActionType::SetLocalContext => {
                let name = require(&action.context_name, "contextName", kind)?;
                let value = self.action_value(action, state, wizard).await?;
                state.local_contexts.insert(name.to_string(), value.clone());
                Some(json!({ "contextName": name, "value": value }))
            }

            ActionType::Unknown(raw) => {
                warn!(action_type = %raw, "unknown action type");
                return Ok(ActionResult::failure(
                    "UNKNOWN",
                    format!("Unknown action type: {}", raw),
                ));
            }
        };
        Ok(ActionResult::success(kind.as_str(), payload))
    }

    /// The nested context when present, else the literal `value`.
    async fn action_value(
        &self,
        action: &Action,
        state: &EvaluationState,
        wizard: &Wizard,
    ) -> Result<Value, AppError> {
        match &action.context {
            Some(context) => self.resolve_context(context, state, wizard).await,
            None => Ok(action.value.clone().unwrap_or(Value::Null)),
        }
    }

    /// Render `template` over the resolved `contexts`; returned verbatim when there are none.
    async fn render_with(
        &self,
        template: &str,
        contexts: &[Context],
        state: &EvaluationState,
        wizard: &Wizard,
    ) -> Result<String, AppError> {
        if contexts.is_empty() {
            return Ok(template.to_string());
        }
        let bindings = self.resolve_bindings(contexts, state, wizard).await?;
        self.templates.render(template, &bindings)
    }
}

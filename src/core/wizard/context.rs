#![allow(clippy::result_large_err)]

use super::state::EvaluationState;
use super::WizardEngine;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use wizard_types::{Context, ContextType, Wizard};

fn missing_field(field: &str, kind: &ContextType) -> AppError {
    AppError::new(
        ErrorCategory::ResolutionError,
        format!("{} required for {} context", field, kind),
    )
    .with_code("WIZ-CTX-001")
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|text| !text.trim().is_empty())
}

/// Direct lookup of a dotted path (`address.city`, `items.0.name`).
fn lookup_path(value: &Value, path: &str) -> Value {
    path.split('.')
        .map(str::trim)
        .try_fold(value, |current, segment| match current {
            Value::Object(fields) => fields.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
        .cloned()
        .unwrap_or(Value::Null)
}

impl WizardEngine {
    /// Resolve a context descriptor to a value.
    ///
    /// Nested `contexts` are resolved first, in order, into named bindings. The
    /// bindings shadow local contexts for this resolution only and are also
    /// visible to the descriptor's own query expression.
    pub fn resolve_context<'a>(
        &'a self,
        context: &'a Context,
        state: &'a EvaluationState,
        wizard: &'a Wizard,
    ) -> BoxFuture<'a, Result<Value, AppError>> {
        async move {
            let bindings = self.resolve_bindings(&context.contexts, state, wizard).await?;
            if bindings.is_empty() {
                self.resolve_kind(context, state, wizard, &bindings).await
            } else {
                let scoped = state.scoped(&bindings);
                self.resolve_kind(context, &scoped, wizard, &bindings).await
            }
        }
        .boxed()
    }

    /// Resolve a list of keyed contexts into a binding map; later keys overwrite earlier ones.
    pub async fn resolve_bindings(
        &self,
        contexts: &[Context],
        state: &EvaluationState,
        wizard: &Wizard,
    ) -> Result<Map<String, Value>, AppError> {
        let mut resolved = Map::new();
        for context in contexts {
            let value = self.resolve_context(context, state, wizard).await?;
            resolved.insert(context.key.clone(), value);
        }
        Ok(resolved)
    }

    async fn resolve_kind(
        &self,
        context: &Context,
        state: &EvaluationState,
        wizard: &Wizard,
        bindings: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        let kind = &context.context_type;
        let expression = non_blank(&context.expression);

        match kind {
            ContextType::Value => Ok(context.value.clone().unwrap_or(Value::Null)),

            ContextType::CurrentStepValues => {
                let slice = Value::Object(state.current_step_values.clone());
                if let Some(expr) = expression {
                    self.query.evaluate(expr, &slice, bindings)
                } else if let Some(field) = non_blank(&context.field_name) {
                    Ok(lookup_path(&slice, field))
                } else {
                    Ok(slice)
                }
            }

            ContextType::AllStepValues => {
                let slice = Value::Object(state.all_step_values.clone());
                self.apply_expression(expression, slice, bindings)
            }

            ContextType::ComponentValues => {
                let name =
                    non_blank(&context.component_name).ok_or_else(|| missing_field("componentName", kind))?;
                let component_state = state
                    .component_states
                    .get(name)
                    .cloned()
                    .unwrap_or(Value::Null);
                self.apply_expression(expression, component_state, bindings)
            }

            ContextType::Template => {
                let template = context
                    .template
                    .as_deref()
                    .ok_or_else(|| missing_field("template", kind))?;
                let mut data = state.template_data();
                data.extend(bindings.clone());
                let rendered = self.templates.render(template, &data)?;
                Ok(serde_json::from_str(&rendered).unwrap_or(Value::String(rendered)))
            }

            ContextType::RemoteAction => {
                let name =
                    non_blank(&context.action_name).ok_or_else(|| missing_field("actionName", kind))?;
                let action = wizard.remote_action(name).ok_or_else(|| {
                    AppError::new(
                        ErrorCategory::ResolutionError,
                        format!("Remote action '{}' not found", name),
                    )
                    .with_code("WIZ-CTX-002")
                })?;
                let mut merged = state.current_step_values.clone();
                merged.extend(bindings.clone());
                let response = self.execute_remote(action, &merged).await?;
                Ok(response.result)
            }

            ContextType::ForEach => {
                let name = non_blank(&context.for_each_name)
                    .ok_or_else(|| missing_field("forEachName", kind))?;
                let frame = state.for_each_frame(name).ok_or_else(|| {
                    AppError::new(
                        ErrorCategory::ResolutionError,
                        format!("ForEach '{}' not found in stack", name),
                    )
                    .with_code("WIZ-CTX-003")
                })?;
                match expression {
                    Some(expr) => self.query.evaluate(expr, &frame.scope_value(), bindings),
                    None => Ok(serde_json::to_value(frame)?),
                }
            }

            ContextType::GroupIndex => {
                let index = state.current_group_index().ok_or_else(|| {
                    AppError::new(ErrorCategory::ResolutionError, "No group index in stack")
                        .with_code("WIZ-CTX-004")
                })?;
                self.apply_expression(expression, Value::from(index), bindings)
            }

            ContextType::LocalContext => {
                if context.key.trim().is_empty() {
                    return Err(missing_field("key", kind));
                }
                let value = state
                    .local_contexts
                    .get(&context.key)
                    .cloned()
                    .unwrap_or(Value::Null);
                self.apply_expression(expression, value, bindings)
            }

            ContextType::Other(raw) => Err(AppError::new(
                ErrorCategory::ResolutionError,
                format!("Unknown context type: {}", raw),
            )
            .with_code("WIZ-CTX-005")),
        }
    }

    fn apply_expression(
        &self,
        expression: Option<&str>,
        input: Value,
        bindings: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        match expression {
            Some(expr) => self.query.evaluate(expr, &input, bindings),
            None => Ok(input),
        }
    }
}

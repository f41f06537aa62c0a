#![allow(clippy::result_large_err)]

use super::state::EvaluationState;
use super::values::{display_string, is_empty, is_truthy, strict_equals, to_number};
use super::WizardEngine;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;
use wizard_types::{Comparison, Condition, Context, Operand, Predicate, Wizard};

impl WizardEngine {
    /// Evaluate a condition tree to a boolean.
    ///
    /// An object with no recognized predicate key is `false`. Resolution failures
    /// inside any branch propagate as errors.
    pub fn evaluate_condition<'a>(
        &'a self,
        condition: &'a Condition,
        state: &'a EvaluationState,
        wizard: &'a Wizard,
    ) -> BoxFuture<'a, Result<bool, AppError>> {
        async move {
            let rule = match condition {
                Condition::Literal(flag) => return Ok(*flag),
                Condition::Rule(rule) => rule,
            };
            let Some(predicate) = rule.predicate() else {
                debug!("condition has no recognized predicate");
                return Ok(false);
            };

            match predicate {
                Predicate::IsEmpty(check) => {
                    let target = self
                        .target_value(check.context.as_ref(), check.path.as_deref(), state, wizard)
                        .await?;
                    Ok(target.map(|value| is_empty(&value)).unwrap_or(true))
                }

                Predicate::MatchesRegex(check) => {
                    let Some(target) = self
                        .target_value(check.context.as_ref(), check.path.as_deref(), state, wizard)
                        .await?
                    else {
                        return Ok(false);
                    };
                    let pattern = Regex::new(&check.value).map_err(|e| {
                        AppError::new(
                            ErrorCategory::ValidationError,
                            format!("Invalid regex '{}': {}", check.value, e),
                        )
                        .with_code("WIZ-CND-001")
                    })?;
                    Ok(pattern.is_match(&display_string(&target)))
                }

                Predicate::Equals(cmp) => {
                    let left = match &cmp.context {
                        Some(context) => Some(self.resolve_context(context, state, wizard).await?),
                        None => None,
                    };
                    let right = self.right_operand(cmp, state, wizard).await?;
                    Ok(match (left, right) {
                        (None, None) => true,
                        (Some(l), Some(r)) => strict_equals(&l, &r),
                        _ => false,
                    })
                }

                Predicate::LessThan(cmp) => {
                    let (left, right) = self.numeric_operands(cmp, state, wizard).await?;
                    Ok(left < right)
                }

                Predicate::MoreThan(cmp) => {
                    let (left, right) = self.numeric_operands(cmp, state, wizard).await?;
                    Ok(left > right)
                }

                Predicate::All(items) => {
                    for item in items {
                        if !self.evaluate_condition(item, state, wizard).await? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }

                Predicate::Any(items) => {
                    for item in items {
                        if self.evaluate_condition(item, state, wizard).await? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }

                Predicate::Not(inner) => Ok(!self.evaluate_condition(inner, state, wizard).await?),

                Predicate::Remote(check) => {
                    let action = wizard.remote_action(&check.name).ok_or_else(|| {
                        AppError::new(
                            ErrorCategory::NotFoundError,
                            format!("Remote action '{}' not found", check.name),
                        )
                        .with_code("WIZ-CND-004")
                    })?;
                    let bindings = self.resolve_bindings(check.bindings(), state, wizard).await?;
                    let mut merged: Map<String, Value> = state.current_step_values.clone();
                    merged.extend(bindings);
                    let response = self.execute_remote(action, &merged).await?;
                    debug!(action = %check.name, ok = response.ok, "remote condition evaluated");
                    Ok(response.ok && is_truthy(&response.result))
                }

                Predicate::Truthy(context) => {
                    let value = self.resolve_context(context, state, wizard).await?;
                    Ok(is_truthy(&value))
                }
            }
        }
        .boxed()
    }

    /// Target of `isEmpty`/`matchesRegex`: the context when given, else a query
    /// over current-step values. `None` when neither is present.
    async fn target_value(
        &self,
        context: Option<&Context>,
        path: Option<&str>,
        state: &EvaluationState,
        wizard: &Wizard,
    ) -> Result<Option<Value>, AppError> {
        if let Some(context) = context {
            return self.resolve_context(context, state, wizard).await.map(Some);
        }
        match path.filter(|p| !p.trim().is_empty()) {
            Some(path) => {
                let values = Value::Object(state.current_step_values.clone());
                self.query.evaluate(path, &values, &Map::new()).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn right_operand(
        &self,
        cmp: &Comparison,
        state: &EvaluationState,
        wizard: &Wizard,
    ) -> Result<Option<Value>, AppError> {
        match &cmp.value {
            None => Ok(None),
            Some(Operand::Literal(value)) => Ok(Some(value.clone())),
            Some(Operand::Context(context)) => {
                self.resolve_context(context, state, wizard).await.map(Some)
            }
        }
    }

    /// Left defaults to `0`; an absent right side is NaN so every ordering fails.
    async fn numeric_operands(
        &self,
        cmp: &Comparison,
        state: &EvaluationState,
        wizard: &Wizard,
    ) -> Result<(f64, f64), AppError> {
        let left = match &cmp.context {
            Some(context) => to_number(&self.resolve_context(context, state, wizard).await?),
            None => 0.0,
        };
        let right = self
            .right_operand(cmp, state, wizard)
            .await?
            .map(|value| to_number(&value))
            .unwrap_or(f64::NAN);
        Ok((left, right))
    }
}

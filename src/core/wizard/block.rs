#![allow(clippy::result_large_err)]

use super::action::ActionResult;
use super::state::{EvaluationState, ForEachFrame};
use super::WizardEngine;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use tracing::debug;
use wizard_types::{Action, Block, BlockKind, Component, EventType, Step, Wizard};

/// Stable sort by `order`; equal keys keep document position.
pub(crate) fn by_order<T>(items: &[T], order: impl Fn(&T) -> f64) -> Vec<&T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| order(a).total_cmp(&order(b)));
    sorted
}

impl WizardEngine {
    /// Execute one block and everything beneath it, returning the action results in order.
    pub fn execute_block<'a>(
        &'a self,
        block: &'a Block,
        state: &'a mut EvaluationState,
        wizard: &'a Wizard,
    ) -> BoxFuture<'a, Result<Vec<ActionResult>, AppError>> {
        async move {
            let kind = block.kind();
            debug!(kind = ?kind, order = block.order, "executing block");

            match kind {
                BlockKind::Actions | BlockKind::Plain => {
                    Ok(self.run_actions(block.actions.as_deref(), state, wizard).await)
                }

                BlockKind::Conditional => {
                    let passed = match &block.conditions {
                        Some(condition) => self.evaluate_condition(condition, state, wizard).await?,
                        None => true,
                    };
                    debug!(passed, "conditional block evaluated");

                    let mut results = self.run_actions(block.actions.as_deref(), state, wizard).await;
                    let branch = if passed { &block.then } else { &block.otherwise };
                    if let Some(blocks) = branch {
                        results.extend(self.execute_blocks(blocks, state, wizard).await?);
                    }
                    Ok(results)
                }

                BlockKind::ForEach => self.run_for_each(block, state, wizard).await,

                // Runs immediately; there is no deferred task queue.
                BlockKind::ScheduleTask => match &block.blocks {
                    Some(blocks) => self.execute_blocks(blocks, state, wizard).await,
                    None => Ok(Vec::new()),
                },
            }
        }
        .boxed()
    }

    /// Execute sibling blocks sorted by `order`, concatenating their results.
    pub async fn execute_blocks(
        &self,
        blocks: &[Block],
        state: &mut EvaluationState,
        wizard: &Wizard,
    ) -> Result<Vec<ActionResult>, AppError> {
        let mut results = Vec::new();
        for block in by_order(blocks, |b| b.order) {
            results.extend(self.execute_block(block, state, wizard).await?);
        }
        Ok(results)
    }

    /// Run the blocks registered for `event` on `component`, or on `step` when no
    /// component is given.
    pub async fn dispatch_event(
        &self,
        wizard: &Wizard,
        step: &Step,
        component: Option<&Component>,
        event: EventType,
        state: &mut EvaluationState,
    ) -> Result<Vec<ActionResult>, AppError> {
        let blocks = match component {
            Some(component) => component.blocks_for(event),
            None => step.blocks_for(event),
        };
        debug!(
            step = %step.name,
            component = component.map(|c| c.name.as_str()).unwrap_or(""),
            event = ?event,
            blocks = blocks.len(),
            "dispatching event"
        );
        self.execute_blocks(blocks, state, wizard).await
    }

    /// Like [`dispatch_event`](Self::dispatch_event), addressing the step and
    /// component by name.
    pub async fn trigger(
        &self,
        wizard: &Wizard,
        step_name: &str,
        component_name: Option<&str>,
        event: EventType,
        state: &mut EvaluationState,
    ) -> Result<Vec<ActionResult>, AppError> {
        let step = wizard.step(step_name).ok_or_else(|| {
            AppError::new(
                ErrorCategory::NotFoundError,
                format!("Step '{}' not found", step_name),
            )
            .with_code("WIZ-BLK-003")
        })?;
        let component = match component_name {
            Some(name) => Some(step.component(name).ok_or_else(|| {
                AppError::new(
                    ErrorCategory::NotFoundError,
                    format!("Component '{}' not found in step '{}'", name, step_name),
                )
                .with_code("WIZ-BLK-004")
            })?),
            None => None,
        };
        self.dispatch_event(wizard, step, component, event, state).await
    }

    async fn run_actions(
        &self,
        actions: Option<&[Action]>,
        state: &mut EvaluationState,
        wizard: &Wizard,
    ) -> Vec<ActionResult> {
        let mut results = Vec::new();
        for action in by_order(actions.unwrap_or_default(), |a| a.order) {
            results.push(self.execute_action(action, state, wizard).await);
        }
        results
    }

    async fn run_for_each(
        &self,
        block: &Block,
        state: &mut EvaluationState,
        wizard: &Wizard,
    ) -> Result<Vec<ActionResult>, AppError> {
        let name = block
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                AppError::new(ErrorCategory::ValidationError, "name required for FOREACH block")
                    .with_code("WIZ-BLK-001")
            })?;
        let context = block.context.as_ref().ok_or_else(|| {
            AppError::new(ErrorCategory::ValidationError, "context required for FOREACH block")
                .with_code("WIZ-BLK-002")
        })?;

        let items = match self.resolve_context(context, state, wizard).await? {
            Value::Array(items) => items,
            other => {
                debug!(loop_name = name, "FOREACH context is not an array: {}", other);
                Vec::new()
            }
        };

        let mut results = Vec::new();
        for (index, item) in items.iter().enumerate() {
            state.push_frame(ForEachFrame {
                name: name.to_string(),
                index,
                item: item.clone(),
                array: items.clone(),
            });
            let iteration = self.run_iteration(block, state, wizard).await;
            state.pop_frame();
            results.extend(iteration?);
        }
        Ok(results)
    }

    async fn run_iteration(
        &self,
        block: &Block,
        state: &mut EvaluationState,
        wizard: &Wizard,
    ) -> Result<Vec<ActionResult>, AppError> {
        let mut results = self.run_actions(block.actions.as_deref(), state, wizard).await;
        if let Some(blocks) = &block.blocks {
            results.extend(self.execute_blocks(blocks, state, wizard).await?);
        }
        Ok(results)
    }
}

#![allow(clippy::result_large_err)]

use super::expression::{is_identifier, QueryEngine};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use wizard_types::{ExpressionKind, Wizard};

fn invalid(code: &str, message: String) -> AppError {
    AppError::new(ErrorCategory::ValidationError, message).with_code(code)
}

/// Check the structural invariants of a wizard document and compile every
/// query expression it carries.
pub fn validate_wizard(wizard: &Wizard, engine: &QueryEngine) -> Result<(), AppError> {
    if wizard.name.trim().is_empty() {
        return Err(invalid("WIZ-DOC-001", "wizard name cannot be empty".to_string()));
    }

    let mut steps = HashSet::new();
    for step in &wizard.steps {
        if !steps.insert(step.name.as_str()) {
            return Err(invalid(
                "WIZ-DOC-002",
                format!("duplicate step name: {}", step.name),
            ));
        }
    }

    if !steps.contains(wizard.initial_step.as_str()) {
        return Err(invalid(
            "WIZ-DOC-003",
            format!(
                "initialStep '{}' is not present in wizard steps",
                wizard.initial_step
            ),
        ));
    }

    let mut actions = HashSet::new();
    for action in &wizard.remote_actions {
        if !is_identifier(&action.name) {
            return Err(invalid(
                "WIZ-DOC-004",
                format!(
                    "remote action name '{}' must match ^[A-Za-z_][A-Za-z0-9_]*$",
                    action.name
                ),
            ));
        }
        if !actions.insert(action.name.as_str()) {
            return Err(invalid(
                "WIZ-DOC-005",
                format!("duplicate remote action name: {}", action.name),
            ));
        }
        if action.url.trim().is_empty() {
            return Err(invalid(
                "WIZ-DOC-006",
                format!("remote action '{}' has empty url", action.name),
            ));
        }
        if let Some((expr, ExpressionKind::Query)) = action.reduction() {
            engine.compile(expr)?;
        }
    }

    let mut queries = Vec::new();
    for step in &wizard.steps {
        collect_queries(&serde_json::to_value(step)?, &mut queries);
    }
    for query in queries {
        engine.compile(&query)?;
    }

    Ok(())
}

/// Gather `expression` and `path` strings from context and condition descriptors.
/// Component property bags and literal values are skipped; a `value` holding a
/// context descriptor is walked.
fn collect_queries(value: &Value, queries: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("component", _) => {}
                    // Comparison operands may be contexts; other values are literals.
                    ("value", Value::Object(operand)) if operand.contains_key("type") => {
                        collect_queries(child, queries)
                    }
                    ("value", _) => {}
                    ("expression" | "path", Value::String(expr)) => {
                        if !expr.trim().is_empty() {
                            queries.push(expr.clone());
                        }
                    }
                    _ => collect_queries(child, queries),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_queries(item, queries);
            }
        }
        _ => {}
    }
}

/// Parse and validate a wizard document from JSON text.
pub fn parse_wizard(text: &str) -> Result<Wizard, AppError> {
    let wizard: Wizard = serde_json::from_str(text).map_err(|err| {
        AppError::new(
            ErrorCategory::ValidationError,
            format!("failed to parse wizard document: {}", err),
        )
        .with_code("WIZ-DOC-007")
    })?;
    validate_wizard(&wizard, &QueryEngine::default())?;
    Ok(wizard)
}

/// Load and validate a wizard document from a JSON file.
pub fn load_wizard(path: &Path) -> Result<Wizard, AppError> {
    let text = fs::read_to_string(path).map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to read {}: {}", path.display(), err),
        )
    })?;
    parse_wizard(&text).map_err(|mut err| {
        err.add_context("path", &path.display().to_string());
        err
    })
}

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use rhai::{Array, Dynamic, Engine, ImmutableString, Map, Scope, AST, INT};
use serde_json::{Map as JsonMap, Number, Value};

/// Query evaluator for the structured query sub-language.
///
/// Every top-level key of the input is exposed as a variable, the whole input
/// is available as `root`, and extra bindings shadow both. Unknown variables,
/// missing map properties and paths through a missing parent evaluate to `()`,
/// which surfaces as `null`.
pub struct QueryEngine {
    engine: Engine,
}

impl Default for QueryEngine {
    fn default() -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(100_000);
        engine.set_max_call_levels(64);
        engine.set_max_expr_depths(64, 64);
        engine.on_print(|_| {});
        engine.on_debug(|_, _, _| {});
        engine.on_var(|name, _index, context| {
            if context.scope().contains(name) {
                Ok(None)
            } else {
                Ok(Some(Dynamic::UNIT))
            }
        });
        // `missing.field` and `missing[0]` stay `()` instead of raising.
        engine.register_indexer_get(|_: &mut (), _: ImmutableString| ());
        engine.register_indexer_get(|_: &mut (), _: INT| ());
        QueryEngine { engine }
    }
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Syntax-check an expression without evaluating it.
    pub fn compile(&self, expr: &str) -> Result<AST, AppError> {
        self.engine.compile(expr).map_err(|err| {
            AppError::new(
                ErrorCategory::QueryError,
                format!("query compile error in `{}`: {}", expr, err),
            )
            .with_code("WIZ-QRY-002")
        })
    }

    /// Evaluate `expr` against `input` with the given variable bindings.
    pub fn evaluate(
        &self,
        expr: &str,
        input: &Value,
        bindings: &JsonMap<String, Value>,
    ) -> Result<Value, AppError> {
        if let Some(value) = lookup_dotted(expr, input, bindings) {
            return Ok(value);
        }

        let mut scope = Scope::new();
        scope.push_dynamic("root", to_dynamic(input));
        if let Value::Object(fields) = input {
            for (key, value) in fields {
                scope.push_dynamic(key.as_str(), to_dynamic(value));
            }
        }
        for (key, value) in bindings {
            scope.push_dynamic(key.as_str(), to_dynamic(value));
        }

        let result = self
            .engine
            .eval_with_scope::<Dynamic>(&mut scope, expr)
            .map_err(|err| {
                AppError::new(
                    ErrorCategory::QueryError,
                    format!("query evaluation error in `{}`: {}", expr, err),
                )
                .with_code("WIZ-QRY-001")
            })?;
        Ok(from_dynamic(result))
    }
}

/// `^[A-Za-z_][A-Za-z0-9_]*$`
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Resolve `a.b.c` without the script engine, following the same shadowing
/// as the scope: bindings, then input keys, then `root`. A missing or null
/// link yields `null`. Returns `None` for anything that is not a plain object
/// path so the script engine handles it.
fn lookup_dotted(expr: &str, input: &Value, bindings: &JsonMap<String, Value>) -> Option<Value> {
    let mut segments = expr.trim().split('.');
    let head = segments.next()?;
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty()
        || matches!(head, "true" | "false" | "this")
        || !is_identifier(head)
        || !rest.iter().all(|segment| is_identifier(segment))
    {
        return None;
    }

    let start = match bindings.get(head) {
        Some(bound) => Some(bound),
        None => match input.as_object().and_then(|fields| fields.get(head)) {
            Some(field) => Some(field),
            None if head == "root" => Some(input),
            None => None,
        },
    };

    let mut current = match start {
        Some(value) => value,
        None => return Some(Value::Null),
    };
    for segment in rest {
        current = match current {
            Value::Object(fields) => match fields.get(segment) {
                Some(next) => next,
                None => return Some(Value::Null),
            },
            Value::Null => return Some(Value::Null),
            _ => return None,
        };
    }
    Some(current.clone())
}

fn to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(flag) => Dynamic::from(*flag),
        Value::Number(n) => match n.as_i64() {
            Some(int) => Dynamic::from(int),
            None => Dynamic::from(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Dynamic::from(s.clone()),
        Value::Array(items) => Dynamic::from_array(items.iter().map(to_dynamic).collect()),
        Value::Object(fields) => {
            let map: Map = fields
                .iter()
                .map(|(key, value)| (key.as_str().into(), to_dynamic(value)))
                .collect();
            Dynamic::from_map(map)
        }
    }
}

fn from_dynamic(value: Dynamic) -> Value {
    if value.is_unit() {
        return Value::Null;
    }
    if let Some(flag) = value.clone().try_cast::<bool>() {
        return Value::Bool(flag);
    }
    if let Some(int) = value.clone().try_cast::<i64>() {
        return Value::Number(Number::from(int));
    }
    if let Some(float) = value.clone().try_cast::<f64>() {
        return Number::from_f64(float)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if value.is_string() {
        return Value::String(value.to_string());
    }
    if value.is_char() {
        return Value::String(value.to_string());
    }
    if let Some(items) = value.clone().try_cast::<Array>() {
        return Value::Array(items.into_iter().map(from_dynamic).collect());
    }
    if let Some(map) = value.try_cast::<Map>() {
        let fields = map
            .into_iter()
            .map(|(key, value)| (key.to_string(), from_dynamic(value)))
            .collect();
        return Value::Object(fields);
    }
    Value::Null
}

use serde_json::{json, Value};
use wizard_engine::core::error::AppError;
use wizard_engine::core::types::ErrorCategory;
use wizard_engine::core::wizard::{EvaluationState, WizardEngine};
use wizard_types::{Condition, Wizard};

fn wizard() -> Wizard {
    serde_json::from_value(json!({
        "name": "checks",
        "initialStep": "form",
        "steps": [{"name": "form", "components": []}]
    }))
    .unwrap()
}

fn state() -> EvaluationState {
    let values = json!({
        "name": "",
        "zero": 0,
        "flag": false,
        "space": " ",
        "list": [],
        "obj": {},
        "age": 36,
        "email": "ada@example.org",
        "password": "s3cret",
        "confirm": "s3cret"
    });
    EvaluationState::new().with_current_step_values(values.as_object().cloned().unwrap())
}

async fn check(condition: Value, state: &EvaluationState) -> Result<bool, AppError> {
    let condition: Condition = serde_json::from_value(condition).unwrap();
    WizardEngine::new()
        .evaluate_condition(&condition, state, &wizard())
        .await
}

fn field(name: &str) -> Value {
    json!({"key": name, "type": "CURRENT_STEP_VALUES", "fieldName": name})
}

#[tokio::test]
async fn boolean_literals() {
    assert!(check(json!(true), &state()).await.unwrap());
    assert!(!check(json!(false), &state()).await.unwrap());
}

#[tokio::test]
async fn is_empty_table() {
    let state = state();
    let cases = [
        ("name", true),
        ("missing", true),
        ("list", true),
        ("obj", true),
        ("zero", false),
        ("flag", false),
        ("space", false),
        ("email", false),
    ];
    for (path, expected) in cases {
        let result = check(json!({"isEmpty": {"path": path}}), &state)
            .await
            .unwrap();
        assert_eq!(result, expected, "isEmpty({})", path);
    }
}

#[tokio::test]
async fn is_empty_on_unfilled_nested_fields() {
    let state = state();
    assert!(check(json!({"isEmpty": {"path": "address.city"}}), &state)
        .await
        .unwrap());
    assert!(check(json!({"isEmpty": {"path": "obj.inner.value"}}), &state)
        .await
        .unwrap());

    let nested = json!({
        "key": "city",
        "type": "CURRENT_STEP_VALUES",
        "expression": "address.city"
    });
    assert!(!check(json!({"equals": {"context": nested, "value": "Oslo"}}), &state)
        .await
        .unwrap());
}

#[tokio::test]
async fn is_empty_prefers_context_and_defaults_to_true() {
    let state = state();
    let by_context = check(
        json!({"isEmpty": {"path": "name", "context": {"key": "k", "type": "VALUE", "value": "x"}}}),
        &state,
    )
    .await
    .unwrap();
    assert!(!by_context);

    assert!(check(json!({"isEmpty": {}}), &state).await.unwrap());
}

#[tokio::test]
async fn matches_regex() {
    let state = state();
    assert!(check(
        json!({"matchesRegex": {"path": "email", "value": "^[^@]+@[^@]+\\.org$"}}),
        &state
    )
    .await
    .unwrap());
    assert!(!check(
        json!({"matchesRegex": {"path": "password", "value": "^[a-z]+$"}}),
        &state
    )
    .await
    .unwrap());
    assert!(check(
        json!({"matchesRegex": {"path": "age", "value": "^\\d+$"}}),
        &state
    )
    .await
    .unwrap());
    assert!(!check(json!({"matchesRegex": {"value": ".*"}}), &state)
        .await
        .unwrap());
}

#[tokio::test]
async fn invalid_regex_is_a_validation_error() {
    let err = check(
        json!({"matchesRegex": {"path": "email", "value": "(["}}),
        &state(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.category, ErrorCategory::ValidationError);
    assert_eq!(err.code, "WIZ-CND-001");
}

#[tokio::test]
async fn equals_is_strict() {
    let state = state();
    assert!(check(json!({"equals": {"context": field("age"), "value": 36}}), &state)
        .await
        .unwrap());
    assert!(!check(json!({"equals": {"context": field("age"), "value": "36"}}), &state)
        .await
        .unwrap());
    assert!(!check(json!({"equals": {"context": field("zero"), "value": false}}), &state)
        .await
        .unwrap());
    assert!(!check(json!({"equals": {"context": field("name"), "value": null}}), &state)
        .await
        .unwrap());
}

#[tokio::test]
async fn equals_compares_against_a_context_operand() {
    let state = state();
    let same = check(
        json!({"equals": {"context": field("password"), "value": field("confirm")}}),
        &state,
    )
    .await
    .unwrap();
    assert!(same);

    let different = check(
        json!({"equals": {"context": field("password"), "value": field("email")}}),
        &state,
    )
    .await
    .unwrap();
    assert!(!different);
}

#[tokio::test]
async fn equals_with_absent_sides() {
    let state = state();
    assert!(check(json!({"equals": {}}), &state).await.unwrap());
    assert!(!check(json!({"equals": {"context": field("age")}}), &state)
        .await
        .unwrap());
    assert!(!check(json!({"equals": {"value": 1}}), &state).await.unwrap());
    assert!(check(json!({"equals": {"context": field("missing"), "value": null}}), &state)
        .await
        .unwrap());
}

#[tokio::test]
async fn ordering_comparisons_coerce_numbers() {
    let state = state();
    assert!(check(json!({"lessThan": {"context": field("age"), "value": 40}}), &state)
        .await
        .unwrap());
    assert!(check(json!({"moreThan": {"context": field("age"), "value": "30"}}), &state)
        .await
        .unwrap());
    assert!(!check(json!({"moreThan": {"context": field("age"), "value": 36}}), &state)
        .await
        .unwrap());
    assert!(check(json!({"lessThan": {"value": 1}}), &state).await.unwrap());
    assert!(!check(json!({"lessThan": {"context": field("age"), "value": "many"}}), &state)
        .await
        .unwrap());
}

#[tokio::test]
async fn ordering_without_right_operand_is_false() {
    let state = state();
    assert!(!check(json!({"lessThan": {"context": field("age")}}), &state)
        .await
        .unwrap());
    assert!(!check(json!({"moreThan": {"context": field("age")}}), &state)
        .await
        .unwrap());
}

#[tokio::test]
async fn logical_operators_short_circuit() {
    let state = state();
    let failing = json!({"context": {"key": "g", "type": "GROUP_INDEX"}});

    assert!(!check(json!({"and": [false, failing.clone()]}), &state)
        .await
        .unwrap());
    assert!(check(json!({"or": [true, failing.clone()]}), &state)
        .await
        .unwrap());

    let err = check(json!({"and": [true, failing]}), &state)
        .await
        .unwrap_err();
    assert_eq!(err.code, "WIZ-CTX-004");

    assert!(check(json!({"and": []}), &state).await.unwrap());
    assert!(!check(json!({"or": []}), &state).await.unwrap());
}

#[tokio::test]
async fn not_and_nesting() {
    let state = state();
    let condition = json!({
        "and": [
            {"not": {"isEmpty": {"path": "email"}}},
            {"or": [
                {"equals": {"context": field("age"), "value": 12}},
                {"moreThan": {"context": field("age"), "value": 18}}
            ]}
        ]
    });
    assert!(check(condition, &state).await.unwrap());
}

#[tokio::test]
async fn bare_context_uses_truthiness() {
    let state = state();
    let literal = |value: Value| json!({"context": {"key": "k", "type": "VALUE", "value": value}});
    assert!(check(literal(json!("yes")), &state).await.unwrap());
    assert!(check(literal(json!([])), &state).await.unwrap());
    assert!(!check(literal(json!(0)), &state).await.unwrap());
    assert!(!check(literal(json!("")), &state).await.unwrap());
    assert!(!check(literal(Value::Null), &state).await.unwrap());
}

#[tokio::test]
async fn unrecognized_condition_is_false() {
    assert!(!check(json!({"startsWith": {"path": "email"}}), &state())
        .await
        .unwrap());
}

#[tokio::test]
async fn remote_condition_requires_a_declared_action() {
    let err = check(json!({"remote": {"name": "verify"}}), &state())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::NotFoundError);
    assert_eq!(err.code, "WIZ-CND-004");
}

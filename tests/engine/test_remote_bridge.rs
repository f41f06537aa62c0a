use serde_json::{json, Map, Value};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wizard_engine::core::config::RemoteConfig;
use wizard_engine::core::types::ErrorCategory;
use wizard_engine::core::wizard::{EvaluationState, WizardEngine};
use wizard_types::{Condition, Context, Wizard};

fn wizard(base: &str) -> Wizard {
    serde_json::from_value(json!({
        "name": "remote",
        "initialStep": "form",
        "steps": [{"name": "form", "components": []}],
        "remoteActions": [
            {
                "name": "create_user",
                "method": "POST",
                "url": format!("{}/users", base),
                "contentType": "JSON",
                "headers": "{\"X-Tenant\": \"{{tenant}}\"}",
                "body": "{\"name\": \"{{name}}\", \"age\": {{age}}}",
                "expression": "result.id"
            },
            {
                "name": "find_user",
                "method": "GET",
                "url": format!("{}/users", base),
                "contentType": "JSON",
                "params": "{\"q\": \"{{name}}\", \"limit\": 5}",
                "body": "{\"ignored\": true}"
            },
            {
                "name": "verify",
                "method": "GET",
                "url": format!("{}/verify/{{{{code}}}}", base),
                "contentType": "JSON",
                "expression": "result.ok"
            },
            {
                "name": "greeting",
                "method": "GET",
                "url": format!("{}/profile", base),
                "contentType": "JSON",
                "expression": "Hi {{data.first}} ({{tenant}})",
                "expressionKind": "TEMPLATE"
            },
            {
                "name": "subscribe",
                "method": "POST",
                "url": format!("{}/subscribe", base),
                "contentType": "URL_ENCODING",
                "body": "{\"email\": \"{{email}}\", \"list\": \"news\"}"
            },
            {
                "name": "upload_meta",
                "method": "PUT",
                "url": format!("{}/meta", base),
                "contentType": "FORM_DATA",
                "body": "{\"title\": \"{{name}}\"}"
            },
            {
                "name": "note",
                "method": "POST",
                "url": format!("{}/notes", base),
                "contentType": "TEXT",
                "body": "note for {{name}}"
            }
        ]
    }))
    .unwrap()
}

fn contexts(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn json_post_renders_headers_and_body_and_reduces_with_a_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("X-Tenant", "acme"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"name": "Ada", "age": 36})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7, "name": "Ada"})))
        .expect(1)
        .mount(&server)
        .await;

    let engine = WizardEngine::new();
    let response = engine
        .run_remote_action(
            &wizard(&server.uri()),
            "create_user",
            &contexts(json!({"tenant": "acme", "name": "Ada", "age": 36})),
        )
        .await
        .unwrap();

    assert!(response.ok);
    assert_eq!(response.status, 201);
    assert_eq!(response.data, json!({"id": 7, "name": "Ada"}));
    assert_eq!(response.result, json!(7));
}

#[tokio::test]
async fn get_appends_params_and_drops_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("q", "Ada"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7}])))
        .expect(1)
        .mount(&server)
        .await;

    let response = WizardEngine::new()
        .run_remote_action(&wizard(&server.uri()), "find_user", &contexts(json!({"name": "Ada"})))
        .await
        .unwrap();

    assert_eq!(response.result, json!([{"id": 7}]));
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn non_success_status_is_not_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/verify/bad"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such code"))
        .mount(&server)
        .await;

    let response = WizardEngine::new()
        .run_remote_action(&wizard(&server.uri()), "verify", &contexts(json!({"code": "bad"})))
        .await
        .unwrap();

    assert!(!response.ok);
    assert_eq!(response.status, 404);
    assert_eq!(response.data, json!("no such code"));
}

#[tokio::test]
async fn template_reduction_sees_data_and_contexts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"first": "Grace"})))
        .mount(&server)
        .await;

    let response = WizardEngine::new()
        .run_remote_action(&wizard(&server.uri()), "greeting", &contexts(json!({"tenant": "navy"})))
        .await
        .unwrap();

    assert_eq!(response.result, json!("Hi Grace (navy)"));
}

#[tokio::test]
async fn url_encoded_and_multipart_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subscribe"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("email=ada%40example.org"))
        .and(body_string_contains("list=news"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/meta"))
        .and(body_string_contains("name=\"title\""))
        .and(body_string_contains("Ada"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let engine = WizardEngine::new();
    let wizard = wizard(&server.uri());
    let values = contexts(json!({"email": "ada@example.org", "name": "Ada"}));

    let subscribed = engine
        .run_remote_action(&wizard, "subscribe", &values)
        .await
        .unwrap();
    assert!(subscribed.ok);
    assert_eq!(subscribed.data, json!(""));

    let uploaded = engine
        .run_remote_action(&wizard, "upload_meta", &values)
        .await
        .unwrap();
    assert!(uploaded.ok);
}

#[tokio::test]
async fn text_body_is_sent_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notes"))
        .and(body_string_contains("note for Ada"))
        .respond_with(ResponseTemplate::new(200).set_body_string("saved"))
        .expect(1)
        .mount(&server)
        .await;

    let response = WizardEngine::new()
        .run_remote_action(&wizard(&server.uri()), "note", &contexts(json!({"name": "Ada"})))
        .await
        .unwrap();
    assert_eq!(response.result, json!("saved"));
}

#[tokio::test]
async fn configured_user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("User-Agent", "acme-forms/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"first": "Ada"})))
        .expect(1)
        .mount(&server)
        .await;

    let engine = WizardEngine::from_config(&RemoteConfig {
        user_agent: "acme-forms/2.0".to_string(),
    })
    .unwrap();
    let response = engine
        .run_remote_action(&wizard(&server.uri()), "greeting", &Map::new())
        .await
        .unwrap();
    assert_eq!(response.result, json!("Hi Ada ()"));
}

#[tokio::test]
async fn remote_condition_is_ok_and_truthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/verify/good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/verify/stale"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": false})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/verify/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let engine = WizardEngine::new();
    let wizard = wizard(&server.uri());
    let state = EvaluationState::new().with_current_step_values(contexts(json!({"code": "good"})));

    let from_step_values: Condition =
        serde_json::from_value(json!({"remote": {"name": "verify"}})).unwrap();
    assert!(engine
        .evaluate_condition(&from_step_values, &state, &wizard)
        .await
        .unwrap());

    for (code, expected) in [("stale", false), ("gone", false), ("good", true)] {
        let condition: Condition = serde_json::from_value(json!({
            "remote": {
                "name": "verify",
                "contexts": [{"key": "code", "type": "VALUE", "value": code}]
            }
        }))
        .unwrap();
        let passed = engine
            .evaluate_condition(&condition, &state, &wizard)
            .await
            .unwrap();
        assert_eq!(passed, expected, "code {}", code);
    }
}

#[tokio::test]
async fn remote_action_context_returns_the_reduced_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({"name": "Ada", "age": 40})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 99})))
        .mount(&server)
        .await;

    let engine = WizardEngine::new();
    let wizard = wizard(&server.uri());
    let state = EvaluationState::new()
        .with_current_step_values(contexts(json!({"tenant": "acme", "name": "Ada", "age": 36})));
    let context: Context = serde_json::from_value(json!({
        "key": "userId",
        "type": "REMOTE_ACTION",
        "actionName": "create_user",
        "contexts": [{"key": "age", "type": "VALUE", "value": 40}]
    }))
    .unwrap();

    let value = engine.resolve_context(&context, &state, &wizard).await.unwrap();
    assert_eq!(value, json!(99));
}

#[tokio::test]
async fn malformed_inputs_are_remote_errors() {
    let engine = WizardEngine::new();

    let bad_body = engine
        .run_remote_action(
            &wizard("http://127.0.0.1:9"),
            "create_user",
            &contexts(json!({"tenant": "acme", "name": "Ada"})),
        )
        .await
        .unwrap_err();
    assert_eq!(bad_body.category, ErrorCategory::RemoteError);
    assert_eq!(bad_body.code, "WIZ-RMT-003");

    let bad_url = engine
        .run_remote_action(&wizard("not a url"), "greeting", &Map::new())
        .await
        .unwrap_err();
    assert_eq!(bad_url.code, "WIZ-RMT-001");

    let unknown = engine
        .run_remote_action(&wizard("http://127.0.0.1:9"), "missing", &Map::new())
        .await
        .unwrap_err();
    assert_eq!(unknown.code, "WIZ-RMT-006");
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = WizardEngine::new()
        .run_remote_action(&wizard(&base), "greeting", &Map::new())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::RemoteError);
    assert_eq!(err.code, "WIZ-RMT-004");
}

use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wizard_engine::core::types::ErrorCategory;
use wizard_engine::core::wizard::{
    load_wizard, parse_wizard, FileWizardStore, MemoryWizardStore, WizardStore,
};
use wizard_types::Wizard;

fn wizard(name: &str) -> Wizard {
    serde_json::from_value(json!({
        "name": name,
        "description": "collects contact details",
        "initialStep": "contact",
        "steps": [{
            "name": "contact",
            "components": [{"name": "email", "componentType": "FIELD", "component": {"label": "Email"}}],
            "events": {
                "ON_MOUNTED": [{"type": "ACTIONS", "order": 0, "actions": [{"type": "INIT_STEP_VALUES", "order": 0}]}]
            }
        }],
        "remoteActions": [{
            "name": "lookup_email",
            "method": "GET",
            "url": "https://api.test/emails/{{email}}",
            "contentType": "JSON",
            "expression": "result.exists"
        }],
        "theme": "dark"
    }))
    .unwrap()
}

#[tokio::test]
async fn file_store_round_trips_documents() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileWizardStore::new(temp_dir.path().join("wizards"));

    store.save(&wizard("contact")).await.unwrap();
    store.save(&wizard("billing")).await.unwrap();

    assert_eq!(store.list().await.unwrap(), vec!["billing", "contact"]);

    let loaded = store.load("contact").await.unwrap();
    assert_eq!(loaded, wizard("contact"));
    assert_eq!(loaded.extra.get("theme"), Some(&json!("dark")));
}

#[tokio::test]
async fn file_store_lists_only_json_documents() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "not a wizard").unwrap();
    let store = FileWizardStore::new(temp_dir.path());
    store.save(&wizard("contact")).await.unwrap();

    assert_eq!(store.list().await.unwrap(), vec!["contact"]);
}

#[tokio::test]
async fn file_store_reports_missing_and_invalid_documents() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileWizardStore::new(temp_dir.path());

    let err = store.load("ghost").await.unwrap_err();
    assert_eq!(err.category, ErrorCategory::NotFoundError);
    assert_eq!(err.code, "WIZ-STORE-001");

    fs::write(
        temp_dir.path().join("broken.json"),
        r#"{"name": "broken", "initialStep": "nowhere", "steps": []}"#,
    )
    .unwrap();
    let err = store.load("broken").await.unwrap_err();
    assert_eq!(err.code, "WIZ-DOC-003");

    let err = store.load("../escape").await.unwrap_err();
    assert_eq!(err.code, "WIZ-STORE-002");
}

#[tokio::test]
async fn stores_refuse_invalid_documents() {
    let mut invalid = wizard("contact");
    invalid.remote_actions.push(invalid.remote_actions[0].clone());

    let temp_dir = TempDir::new().unwrap();
    let file_store = FileWizardStore::new(temp_dir.path());
    let err = file_store.save(&invalid).await.unwrap_err();
    assert_eq!(err.code, "WIZ-DOC-005");
    assert!(file_store.list().await.unwrap().is_empty());

    let memory_store = MemoryWizardStore::new();
    assert!(memory_store.save(&invalid).await.is_err());
}

#[test]
fn memory_store_keeps_documents_in_name_order() {
    let store = MemoryWizardStore::new();
    tokio_test::block_on(async {
        store.save(&wizard("zeta")).await.unwrap();
        store.save(&wizard("alpha")).await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["alpha", "zeta"]);
        assert_eq!(store.load("alpha").await.unwrap().name, "alpha");
        assert_eq!(
            store.load("beta").await.unwrap_err().code,
            "WIZ-STORE-001"
        );
    });
}

#[test]
fn load_wizard_reads_and_validates_files() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("contact.json");
    fs::write(&path, serde_json::to_string_pretty(&wizard("contact")).unwrap()).unwrap();
    assert_eq!(load_wizard(&path).unwrap().name, "contact");

    fs::write(&path, "{ not json").unwrap();
    let err = load_wizard(&path).unwrap_err();
    assert_eq!(err.code, "WIZ-DOC-007");
    assert!(err.context.contains_key("path"));
}

#[test]
fn parse_wizard_rejects_bad_queries() {
    let mut doc = serde_json::to_value(wizard("contact")).unwrap();
    doc["remoteActions"][0]["expression"] = json!("result.exists &&");
    let err = parse_wizard(&doc.to_string()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::QueryError);
    assert_eq!(err.code, "WIZ-QRY-002");
}

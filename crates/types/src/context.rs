use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Source a context descriptor pulls its value from.
///
/// Unrecognized type strings are kept verbatim in [`ContextType::Other`] so the
/// resolver can report them instead of failing the whole document at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContextType {
    Value,
    CurrentStepValues,
    AllStepValues,
    ComponentValues,
    Template,
    RemoteAction,
    ForEach,
    GroupIndex,
    LocalContext,
    Other(String),
}

impl ContextType {
    pub fn as_str(&self) -> &str {
        match self {
            ContextType::Value => "VALUE",
            ContextType::CurrentStepValues => "CURRENT_STEP_VALUES",
            ContextType::AllStepValues => "ALL_STEP_VALUES",
            ContextType::ComponentValues => "COMPONENT_VALUES",
            ContextType::Template => "TEMPLATE",
            ContextType::RemoteAction => "REMOTE_ACTION",
            ContextType::ForEach => "FOREACH",
            ContextType::GroupIndex => "GROUP_INDEX",
            ContextType::LocalContext => "LOCAL_CONTEXT",
            ContextType::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for ContextType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "VALUE" => ContextType::Value,
            "CURRENT_STEP_VALUES" => ContextType::CurrentStepValues,
            "ALL_STEP_VALUES" => ContextType::AllStepValues,
            "COMPONENT_VALUES" => ContextType::ComponentValues,
            "TEMPLATE" => ContextType::Template,
            "REMOTE_ACTION" => ContextType::RemoteAction,
            "FOREACH" => ContextType::ForEach,
            "GROUP_INDEX" => ContextType::GroupIndex,
            "LOCAL_CONTEXT" | "LOCAL" => ContextType::LocalContext,
            _ => ContextType::Other(raw),
        }
    }
}

impl From<ContextType> for String {
    fn from(kind: ContextType) -> Self {
        match kind {
            ContextType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ContextType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged value descriptor. `key` names the binding when the context is used as
/// a nested sub-context of another descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "type")]
    pub context_type: ContextType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_each_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<Context>,
}

impl Context {
    /// Bare descriptor of the given type with every optional field unset.
    pub fn of_type(context_type: ContextType) -> Self {
        Context {
            key: String::new(),
            context_type,
            value: None,
            expression: None,
            field_name: None,
            component_name: None,
            action_name: None,
            for_each_name: None,
            template: None,
            contexts: Vec::new(),
        }
    }

    /// Literal VALUE context.
    pub fn literal(value: Value) -> Self {
        Context {
            value: Some(value),
            ..Context::of_type(ContextType::Value)
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

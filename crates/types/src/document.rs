use crate::block::Block;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// UI event a list of blocks can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    OnClick,
    OnChange,
    OnMounted,
    OnBlur,
    OnFocus,
    RestrictionFailed,
    OnWindowBeforeUnload,
}

pub type Events = BTreeMap<EventType, Vec<Block>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    Text,
    Field,
    Button,
    Alert,
    Spinner,
    Label,
}

/// UI element. Rendering details live in `component` and are opaque to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(default)]
    pub order: f64,
    pub name: String,
    pub component_type: ComponentType,
    #[serde(default)]
    pub component: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub events: Events,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Position>,
}

/// Layout slot around a component holding further nested components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
}

impl Component {
    pub fn blocks_for(&self, event: EventType) -> &[Block] {
        self.events.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Depth-first search through this component and its position slots.
    pub fn find(&self, name: &str) -> Option<&Component> {
        if self.name == name {
            return Some(self);
        }
        [&self.top, &self.left, &self.right, &self.bottom]
            .into_iter()
            .flatten()
            .flat_map(|position| position.components.iter())
            .find_map(|child| child.find(name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub events: Events,
}

impl Step {
    pub fn blocks_for(&self, event: EventType) -> &[Block] {
        self.events.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find_map(|component| component.find(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// GET and DELETE requests are sent without a body.
    pub fn carries_body(&self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Json,
    UrlEncoding,
    FormData,
    Text,
}

/// How a remote action's `expression` reduces the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpressionKind {
    Template,
    #[default]
    Query,
}

/// Declared outbound HTTP call. `url`, `headers`, `params` and `body` are templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAction {
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_kind: Option<ExpressionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_name: Option<String>,
}

impl RemoteAction {
    /// Non-blank reduction expression, if any.
    pub fn reduction(&self) -> Option<(&str, ExpressionKind)> {
        self.expression
            .as_deref()
            .filter(|expr| !expr.trim().is_empty())
            .map(|expr| (expr, self.expression_kind.unwrap_or_default()))
    }
}

/// Root wizard document. Unknown top-level fields are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wizard {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub initial_step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remote_actions: Vec<RemoteAction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Wizard {
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.name == name)
    }

    pub fn remote_action(&self, name: &str) -> Option<&RemoteAction> {
        self.remote_actions.iter().find(|action| action.name == name)
    }
}

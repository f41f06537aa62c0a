#![allow(clippy::result_large_err)]

use super::WizardEngine;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;
use wizard_types::{ContentType, ExpressionKind, HttpMethod, RemoteAction, Wizard};

/// Encoded request body handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(String),
    Text(String),
    Form(Vec<(String, String)>),
    Multipart(Vec<(String, String)>),
}

/// Fully rendered outbound call.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RemoteRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw reply from the transport.
#[derive(Debug, Clone)]
pub struct RemoteReply {
    pub status: u16,
    pub body: String,
}

/// Outcome of a remote action: raw parsed `data` and the reduced `result`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteResponse {
    pub ok: bool,
    pub status: u16,
    pub data: Value,
    pub result: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request build error: {0}")]
    RequestError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Response read error: {0}")]
    ResponseError(String),
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        AppError::new(ErrorCategory::RemoteError, err.to_string()).with_code("WIZ-RMT-004")
    }
}

/// HTTP collaborator used by the remote bridge.
#[async_trait]
pub trait RemoteTransport: Send + Sync + 'static {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteReply, TransportError>;
}

/// Transport backed by a shared `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                AppError::new(
                    ErrorCategory::RemoteError,
                    format!("Failed to build HTTP client: {}", e),
                )
                .with_code("WIZ-RMT-005")
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteTransport for ReqwestTransport {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteReply, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.client.request(method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(raw) | RequestBody::Text(raw) => builder.body(raw),
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Multipart(pairs) => {
                let form = pairs
                    .into_iter()
                    .fold(reqwest::multipart::Form::new(), |form, (key, value)| {
                        form.text(key, value)
                    });
                builder.multipart(form)
            }
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                TransportError::RequestError(e.to_string())
            } else {
                TransportError::NetworkError(e.to_string())
            }
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::ResponseError(e.to_string()))?;
        Ok(RemoteReply { status, body })
    }
}

impl WizardEngine {
    /// Run the remote action `name` declared on `wizard`.
    pub async fn run_remote_action(
        &self,
        wizard: &Wizard,
        name: &str,
        contexts: &Map<String, Value>,
    ) -> Result<RemoteResponse, AppError> {
        let action = wizard.remote_action(name).ok_or_else(|| {
            AppError::new(
                ErrorCategory::NotFoundError,
                format!("Remote action '{}' not found", name),
            )
            .with_code("WIZ-RMT-006")
        })?;
        self.execute_remote(action, contexts).await
    }

    /// Render, send and reduce one remote action against a flat context map.
    pub async fn execute_remote(
        &self,
        action: &RemoteAction,
        contexts: &Map<String, Value>,
    ) -> Result<RemoteResponse, AppError> {
        let request = self.build_request(action, contexts)?;
        debug!(
            action = %action.name,
            method = request.method.as_str(),
            url = %request.url,
            "sending remote action"
        );

        let reply = self.transport.send(request).await?;
        let ok = (200..300).contains(&reply.status);
        debug!(action = %action.name, status = reply.status, "remote action replied");

        let data = serde_json::from_str::<Value>(&reply.body).unwrap_or(Value::String(reply.body));
        let result = self.reduce_response(action, &data, contexts)?;
        Ok(RemoteResponse {
            ok,
            status: reply.status,
            data,
            result,
        })
    }

    pub(crate) fn build_request(
        &self,
        action: &RemoteAction,
        contexts: &Map<String, Value>,
    ) -> Result<RemoteRequest, AppError> {
        let rendered_url = self.templates.render(&action.url, contexts)?;
        let mut url = Url::parse(rendered_url.trim()).map_err(|e| {
            AppError::new(
                ErrorCategory::RemoteError,
                format!("Invalid url '{}': {}", rendered_url, e),
            )
            .with_code("WIZ-RMT-001")
        })?;

        let mut headers: Vec<(String, String)> = match &action.headers {
            Some(template) => form_pairs(&self.render_object(template, contexts, "headers")?),
            None => Vec::new(),
        };

        if let Some(template) = &action.params {
            let params = self.render_object(template, contexts, "params")?;
            apply_params(&mut url, &params);
        }

        if action.content_type == ContentType::Json
            && action.method != HttpMethod::Get
            && !headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let body = match &action.body {
            Some(template) if action.method.carries_body() => {
                self.encode_body(action.content_type, template, contexts)?
            }
            _ => RequestBody::Empty,
        };

        Ok(RemoteRequest {
            method: action.method,
            url,
            headers,
            body,
        })
    }

    fn encode_body(
        &self,
        content_type: ContentType,
        template: &str,
        contexts: &Map<String, Value>,
    ) -> Result<RequestBody, AppError> {
        match content_type {
            ContentType::Json => {
                let rendered = self.templates.render(template, contexts)?;
                let parsed: Value = serde_json::from_str(&rendered).map_err(|e| {
                    AppError::new(
                        ErrorCategory::RemoteError,
                        format!("body must be valid JSON after interpolation: {}", e),
                    )
                    .with_code("WIZ-RMT-003")
                })?;
                Ok(RequestBody::Json(parsed.to_string()))
            }
            ContentType::Text => Ok(RequestBody::Text(self.templates.render(template, contexts)?)),
            ContentType::UrlEncoding => Ok(RequestBody::Form(form_pairs(
                &self.render_object(template, contexts, "body")?,
            ))),
            ContentType::FormData => Ok(RequestBody::Multipart(form_pairs(
                &self.render_object(template, contexts, "body")?,
            ))),
        }
    }

    /// Render a template that must produce a JSON object string.
    fn render_object(
        &self,
        template: &str,
        contexts: &Map<String, Value>,
        field: &str,
    ) -> Result<Map<String, Value>, AppError> {
        let rendered = self.templates.render(template, contexts)?;
        match serde_json::from_str::<Value>(&rendered) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(_) => Err(AppError::new(
                ErrorCategory::RemoteError,
                format!("{} must be a JSON object string after interpolation", field),
            )
            .with_code("WIZ-RMT-002")),
            Err(_) => Err(AppError::new(
                ErrorCategory::RemoteError,
                format!("{} must be a JSON string after interpolation", field),
            )
            .with_code("WIZ-RMT-002")),
        }
    }

    fn reduce_response(
        &self,
        action: &RemoteAction,
        data: &Value,
        contexts: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        match action.reduction() {
            None => Ok(data.clone()),
            Some((template, ExpressionKind::Template)) => {
                let mut scope = contexts.clone();
                scope.insert("data".to_string(), data.clone());
                Ok(Value::String(self.templates.render(template, &scope)?))
            }
            Some((expr, ExpressionKind::Query)) => {
                let mut bindings = Map::new();
                bindings.insert("context".to_string(), Value::Object(contexts.clone()));
                bindings.insert("data".to_string(), data.clone());
                bindings.insert("result".to_string(), data.clone());
                self.query.evaluate(expr, data, &bindings)
            }
        }
    }
}

/// Text form of a header, param or form field; `null` entries are dropped.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn form_pairs(fields: &Map<String, Value>) -> Vec<(String, String)> {
    fields
        .iter()
        .filter_map(|(key, value)| field_text(value).map(|text| (key.clone(), text)))
        .collect()
}

/// Set query parameters, replacing any existing pairs with the same key.
fn apply_params(url: &mut Url, params: &Map<String, Value>) {
    let updates = form_pairs(params);
    if updates.is_empty() {
        return;
    }
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !updates.iter().any(|(name, _)| name == key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .extend_pairs(updates);
}

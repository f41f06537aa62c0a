use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde_json::{Map, Value};

handlebars_helper!(prettyjson: |value: Json| serde_json::to_string_pretty(value).unwrap_or_default());
handlebars_helper!(json: |value: Json| value.to_string());

/// Renders `{{name}}`-style templates over a JSON data object.
///
/// Missing names render as empty text and output is never HTML-escaped.
pub struct TemplateEngine {
    registry: Handlebars<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_escape_fn(no_escape);
        registry.register_helper("prettyjson", Box::new(prettyjson));
        registry.register_helper("json", Box::new(json));
        TemplateEngine { registry }
    }
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, template: &str, data: &Map<String, Value>) -> Result<String, AppError> {
        self.registry.render_template(template, data).map_err(|err| {
            AppError::new(
                ErrorCategory::TemplateError,
                format!("template render error: {}", err),
            )
            .with_code("WIZ-TPL-001")
        })
    }
}

use wizard_engine::core::error::AppError;
use wizard_engine::core::types::{ErrorCategory, ErrorSeverity};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_codes_follow_category() {
        let cases = [
            (ErrorCategory::ValidationError, "WIZ-DOC-000"),
            (ErrorCategory::ResolutionError, "WIZ-CTX-000"),
            (ErrorCategory::QueryError, "WIZ-QRY-000"),
            (ErrorCategory::TemplateError, "WIZ-TPL-000"),
            (ErrorCategory::RemoteError, "WIZ-RMT-000"),
            (ErrorCategory::IoError, "IO_ERROR"),
        ];
        for (category, code) in cases {
            assert_eq!(AppError::new(category, "x").code, code);
        }
    }

    #[test]
    fn test_display_includes_code_category_and_context() {
        let mut error = AppError::new(ErrorCategory::RemoteError, "call failed")
            .with_code("WIZ-RMT-004");
        error.add_context("action", "lookup");
        let text = error.to_string();
        assert!(text.starts_with("[WIZ-RMT-004] RemoteError: call failed"));
        assert!(text.contains("lookup"));
        assert_eq!(error.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: AppError = io.into();
        assert_eq!(error.category, ErrorCategory::IoError);
        assert!(error.source.is_some());
    }

    #[test]
    fn test_json_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: AppError = parse.into();
        assert_eq!(error.category, ErrorCategory::SerializationError);
        assert_eq!(error.code, "WIZ-SER-001");
    }

    #[test]
    fn test_anyhow_errors_keep_their_source() {
        let error: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(error.category, ErrorCategory::InternalError);
        assert_eq!(error.message, "boom");
        assert!(error.source.is_some());
    }

    #[test]
    fn test_with_source_chains_the_cause() {
        let error = AppError::with_source(
            ErrorCategory::TemplateError,
            "render failed",
            Box::new(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
        );
        assert!(error.to_string().contains("Caused by: disk"));
    }
}

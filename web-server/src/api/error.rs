// web-server/src/api/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use common::UploaderError;
use serde_json::json;
use std::fmt;

/// Operation failure rendered as `{"status":"error","message":...}`
#[derive(Debug)]
pub struct ApiError {
    /// What the user was doing, e.g. "Sign in failed"
    pub context: &'static str,
    pub source: UploaderError,
}

impl ApiError {
    pub fn new(context: &'static str, source: UploaderError) -> Self {
        Self { context, source }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            // Validation messages already read as complete sentences
            UploaderError::Validation(message) => write!(f, "{}", message),
            other => write!(f, "{}: {}", self.context, other),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.source {
            UploaderError::Validation(_) => StatusCode::BAD_REQUEST,
            UploaderError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            UploaderError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UploaderError::Service { .. } | UploaderError::Transport(_) | UploaderError::Parse(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "status": "error",
            "message": self.to_string(),
            "upstream_status": self.source.status(),
        }))
    }
}

/// Attach an operation name to a core error
pub trait Context<T> {
    fn context(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> Context<T> for Result<T, UploaderError> {
    fn context(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::warn!("{}: {}", context, e);
            ApiError::new(context, e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_bad_request_without_prefix() {
        let err = ApiError::new("Sign in failed", UploaderError::validation("Sign in requires email + password."));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Sign in requires email + password.");
    }

    #[test]
    fn test_service_error_is_prefixed() {
        let err = ApiError::new(
            "Sign in failed",
            UploaderError::Service { status: 400, message: "INVALID_PASSWORD".to_string() },
        );
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Sign in failed: INVALID_PASSWORD");
    }

    #[test]
    fn test_config_error_is_unavailable() {
        let err = ApiError::new("Create account failed", UploaderError::Config("Missing API key".into()));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Codegate service error variants.
///
/// Rejected verify/reactivate attempts are not errors: they come back as a
/// [`CodeRejection`](crate::domain::types::CodeRejection) inside a 200 response.
#[derive(Debug, thiserror::Error)]
pub enum CodegateError {
    #[error("{0}")]
    Validation(String),
    #[error("project not found")]
    ProjectNotFound,
    #[error("code not found")]
    CodeNotFound,
    #[error("api key not found")]
    ApiKeyNotFound,
    #[error("project already exists")]
    ProjectAlreadyExists,
    /// Every authentication sub-cause maps here with the same message.
    #[error("invalid credentials")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("too many verification attempts")]
    RateLimited,
    #[error("code generation exhausted")]
    CodeGenerationExhausted,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl CodegateError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ProjectNotFound => "PROJECT_NOT_FOUND",
            Self::CodeNotFound => "CODE_NOT_FOUND",
            Self::ApiKeyNotFound => "API_KEY_NOT_FOUND",
            Self::ProjectAlreadyExists => "PROJECT_ALREADY_EXISTS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::RateLimited => "RATE_LIMITED",
            Self::CodeGenerationExhausted => "CODE_GENERATION_EXHAUSTED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for CodegateError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ProjectNotFound | Self::CodeNotFound | Self::ApiKeyNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::ProjectAlreadyExists => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::CodeGenerationExhausted | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
            }
            Self::CodeGenerationExhausted => {
                tracing::error!(kind = self.kind(), "code generation exhausted");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        let mut response = (status, axum::Json(body)).into_response();
        if matches!(self, Self::RateLimited) {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from_static("60"));
        }
        response
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failures of the plan generation pipeline.
///
/// Backend failures are only surfaced after every candidate model has been
/// tried. Parse failures are never retried automatically.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation quota exceeded ({model}): {detail}")]
    QuotaExceeded { model: String, detail: String },

    #[error("Generation model not found ({model}): {detail}")]
    BackendNotFound { model: String, detail: String },

    #[error("Access to generation model forbidden ({model}): {detail}")]
    BackendForbidden { model: String, detail: String },

    #[error("Generation model timed out ({model}) after {seconds}s")]
    BackendTimedOut { model: String, seconds: u64 },

    #[error("Generation model failed ({model}): {detail}")]
    BackendFailed { model: String, detail: String },

    #[error("No working generation backend")]
    NoWorkingBackend,

    #[error("Plan generation cancelled")]
    Cancelled,

    #[error("Malformed generation response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    #[error("Generated plan has an unsupported format: {reason}")]
    InvalidPlanFormat {
        reason: String,
        value: serde_json::Value,
    },
}

impl GenerationError {
    /// Actionable hint naming the likely cause.
    pub fn hint(&self) -> &'static str {
        match self {
            GenerationError::QuotaExceeded { .. } => {
                "The AI service quota is exhausted. Try again later or check your plan limits."
            }
            GenerationError::BackendNotFound { .. } => {
                "The configured AI models are unavailable. Check the model list in the server configuration."
            }
            GenerationError::BackendForbidden { .. } => {
                "The AI service rejected the API key. Check that the key is valid and the API is enabled."
            }
            GenerationError::BackendTimedOut { .. } => {
                "The AI service did not answer in time. Try again in a moment."
            }
            GenerationError::BackendFailed { .. } | GenerationError::NoWorkingBackend => {
                "The AI service is currently unreachable. Try again later."
            }
            GenerationError::Cancelled => "The request was cancelled before a plan was generated.",
            GenerationError::MalformedResponse { .. } | GenerationError::InvalidPlanFormat { .. } => {
                "The AI returned an unusable plan. Generate the plan again."
            }
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::QuotaExceeded { .. } => "quota_exceeded",
            GenerationError::BackendNotFound { .. } => "backend_not_found",
            GenerationError::BackendForbidden { .. } => "backend_forbidden",
            GenerationError::BackendTimedOut { .. } => "backend_timeout",
            GenerationError::BackendFailed { .. } => "backend_error",
            GenerationError::NoWorkingBackend => "no_working_backend",
            GenerationError::Cancelled => "cancelled",
            GenerationError::MalformedResponse { .. } => "malformed_response",
            GenerationError::InvalidPlanFormat { .. } => "invalid_plan_format",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            GenerationError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            GenerationError::BackendTimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
            GenerationError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Seconds clients should wait before retrying after a quota error.
pub const QUOTA_RETRY_AFTER_SECS: u64 = 60;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Remote write failed: {0}")]
    RemoteWriteFailed(String),

    #[error("Local cache error: {0}")]
    LocalCache(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Check if this error means the generation quota is exhausted.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(
            self,
            AppError::Generation(GenerationError::QuotaExceeded { .. })
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retry_after = self.is_quota_exceeded();
        let (status, error, details, hint) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None, None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None, None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()), None)
            }
            AppError::Generation(err) => {
                match err {
                    GenerationError::MalformedResponse { reason, raw } => {
                        tracing::error!(reason = %reason, raw = %raw, "Unparseable plan response");
                    }
                    GenerationError::InvalidPlanFormat { reason, value } => {
                        tracing::error!(reason = %reason, value = %value, "Unsupported plan shape");
                    }
                    other => tracing::warn!(error = %other, "Plan generation failed"),
                }
                (err.status(), err.code(), None, Some(err.hint().to_string()))
            }
            AppError::RemoteWriteFailed(msg) => {
                tracing::error!(error = %msg, "Remote write failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "remote_write_failed",
                    None,
                    Some("Your cloud profile could not be updated. Check your connection and try again.".to_string()),
                )
            }
            AppError::LocalCache(msg) => {
                tracing::error!(error = %msg, "Local cache error");
                (StatusCode::INTERNAL_SERVER_ERROR, "local_cache_error", None, None)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None, None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None, None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            hint,
        };

        if retry_after {
            return (
                status,
                [(header::RETRY_AFTER, QUOTA_RETRY_AFTER_SECS.to_string())],
                Json(body),
            )
                .into_response();
        }
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_maps_to_429_with_hint() {
        let err = AppError::from(GenerationError::QuotaExceeded {
            model: "gemini-2.0-flash".to_string(),
            detail: "Resource has been exhausted".to_string(),
        });
        assert!(err.is_quota_exceeded());

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "60"
        );
    }

    #[test]
    fn test_parse_failures_are_bad_gateway() {
        let err = AppError::from(GenerationError::MalformedResponse {
            reason: "expected value at line 1 column 1".to_string(),
            raw: "Hier ist dein Plan".to_string(),
        });
        assert!(!err.is_quota_exceeded());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn test_every_generation_error_has_hint() {
        let errors = [
            GenerationError::NoWorkingBackend,
            GenerationError::Cancelled,
            GenerationError::BackendTimedOut {
                model: "m".to_string(),
                seconds: 3,
            },
        ];
        for err in errors {
            assert!(!err.hint().is_empty());
        }
    }
}

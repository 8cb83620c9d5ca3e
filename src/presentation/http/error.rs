use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::error::ServiceError;
use crate::application::services::jwt::TokenError;

/// Diagnostic detail attached to error responses and logged by the response logger.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_anyhow(source: &'static str, error: &anyhow::Error) -> Self {
        Self {
            source,
            messages: error.chain().map(|c| c.to_string()).collect(),
        }
    }

    pub fn from_message(source: &'static str, message: impl Into<String>) -> Self {
        Self {
            source,
            messages: vec![message.into()],
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `error`.
    pub status: &'static str,
    pub error: String,
}

/// Error returned by handlers; only `message` reaches the client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            report: ErrorReport::from_message("presentation::http", message.clone()),
            message,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal(source: &'static str, error: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error".into(),
            report: ErrorReport::from_anyhow(source, &error),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let simple = |status: StatusCode, message: String| Self {
            report: ErrorReport::from_message("application::use_case", message.clone()),
            status,
            message,
        };
        match err {
            ServiceError::NotFound(m) => simple(StatusCode::NOT_FOUND, m),
            ServiceError::Conflict(m) => simple(StatusCode::CONFLICT, m),
            ServiceError::BadRequest(m) => simple(StatusCode::BAD_REQUEST, m),
            ServiceError::Unauthorized(m) => simple(StatusCode::UNAUTHORIZED, m),
            ServiceError::Forbidden(m) => simple(StatusCode::FORBIDDEN, m),
            ServiceError::Unavailable(m) => simple(StatusCode::SERVICE_UNAVAILABLE, m),
            ServiceError::Upstream { message, source } => Self {
                status: StatusCode::BAD_GATEWAY,
                report: ErrorReport::from_anyhow("infrastructure::upstream", &source),
                message,
            },
            ServiceError::Internal(e) => Self::internal("application::use_case", e),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let reason = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field} {reason}")
            })
            .collect();
        fields.sort();
        Self::bad_request(fields.join("; "))
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        Self::unauthorized(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: "error",
            error: self.message,
        };
        let mut response = (self.status, Json(body)).into_response();
        response.extensions_mut().insert(self.report);
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

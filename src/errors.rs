use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::reports::ReportError;

/// Failures raised by the pure evaluation core.
///
/// "Insufficient data" is not an error: rate and average computations return
/// `Option` and report `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".into()),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Configuration(msg) => {
                tracing::error!(error = %msg, "Evaluation rejected configuration");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

impl From<EvalError> for AppError {
    fn from(e: EvalError) -> Self {
        match e {
            EvalError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            EvalError::MalformedRecord(msg) => AppError::Unprocessable(msg),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::NotFound(name) => AppError::NotFound(format!("report {name} not found")),
            ReportError::InvalidName(name) => {
                AppError::BadRequest(format!("invalid report name: {name}"))
            }
            ReportError::Malformed(inner) => inner.into(),
            ReportError::Io(e) => AppError::Internal(e.into()),
        }
    }
}

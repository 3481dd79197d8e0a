use crate::utils::error::SyncError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    ServiceUnavailable { message: String, details: Option<String> },
    NotFound { message: String, details: Option<String> },
    Internal { message: String, details: Option<String> },
}

impl ApiError {
    pub fn unavailable(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::Internal {
            message: "Internal server error".to_string(),
            details: Some(details.into()),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::NotFoundError { name } => ApiError::NotFound {
                message: "Country not found".to_string(),
                details: Some(format!("no country named '{}'", name)),
            },
            SyncError::UpstreamFetchError { .. } | SyncError::ApiError(_) => {
                ApiError::unavailable("External data source unavailable", err.to_string())
            }
            other => {
                tracing::error!("Request failed: {}", other);
                ApiError::internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            ApiError::ServiceUnavailable { message, details } => {
                (StatusCode::SERVICE_UNAVAILABLE, message, details)
            }
            ApiError::NotFound { message, details } => (StatusCode::NOT_FOUND, message, details),
            ApiError::Internal { message, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, details)
            }
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                details,
            }),
        )
            .into_response()
    }
}

//! HTTP-facing error type shared by every route.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::content::{ContentError, InvalidPageKey};
use crate::records::RecordError;
use crate::session::SessionError;

/// Error body returned by every JSON endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidKey(#[from] InvalidPageKey),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("invalid session: {0}")]
    SessionInvalid(#[from] SessionError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Storage(#[from] ContentError),

    #[error(transparent)]
    Records(#[from] RecordError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidKey(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) | ApiError::SessionInvalid(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Records(RecordError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Records(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::InvalidKey(e) => ErrorResponse {
                error: "Page not found".to_string(),
                message: Some(e.to_string()),
            },
            ApiError::SessionInvalid(e) => ErrorResponse {
                error: "Unauthorized".to_string(),
                message: Some(e.to_string()),
            },
            ApiError::Records(RecordError::NotFound(_)) => ErrorResponse {
                error: "Not found".to_string(),
                message: None,
            },
            // Storage details stay in the logs.
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "content storage failure");
                ErrorResponse {
                    error: "Content storage failure".to_string(),
                    message: None,
                }
            }
            ApiError::Records(e) => {
                tracing::error!(error = %e, "record store failure");
                ErrorResponse {
                    error: "Record storage failure".to_string(),
                    message: None,
                }
            }
            other => ErrorResponse {
                error: other.to_string(),
                message: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PageKey;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(InvalidPageKey("pricing".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized("Authorization required").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(SessionError::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(ContentError::NotFound(PageKey::Home)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(RecordError::NotFound(uuid::Uuid::nil())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_storage_error_body_is_generic() {
        let err = ApiError::from(ContentError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/srv/secret/path denied",
        )));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Content storage failure");
        assert!(body.message.is_none());
        assert!(!String::from_utf8_lossy(&bytes).contains("/srv/secret"));
    }
}

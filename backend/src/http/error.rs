//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::db::repository::RepositoryError;
use crate::geocode::GeocodeError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Geocoding provider rejected the address
    GeocodeFailed(String),
    /// Geocoding provider unreachable or unreadable
    Upstream(String),
    /// Server misconfiguration
    Configuration(String),
    /// Data store failure; details stay in the server log
    Repository(RepositoryError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::GeocodeFailed(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) | AppError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::NotFound(msg) => ApiError::new("NOT_FOUND", msg),
            AppError::BadRequest(msg) => ApiError::new("BAD_REQUEST", msg),
            AppError::GeocodeFailed(msg) => ApiError::new("GEOCODE_FAILED", msg),
            AppError::Upstream(msg) => {
                warn!(error = %msg, "Upstream failure");
                ApiError::new("UPSTREAM_ERROR", msg)
            }
            AppError::Configuration(msg) => {
                error!(error = %msg, "Configuration error");
                ApiError::new("CONFIGURATION_ERROR", msg)
            }
            AppError::Repository(e) => {
                error!(error = %e, "Repository error");
                ApiError::new("REPOSITORY_ERROR", "Database error")
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => AppError::NotFound(err.message().to_string()),
            RepositoryError::ValidationError { .. } => {
                AppError::BadRequest(err.message().to_string())
            }
            _ => AppError::Repository(err),
        }
    }
}

impl From<GeocodeError> for AppError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::MissingApiKey => AppError::Configuration(err.to_string()),
            GeocodeError::EmptyAddress => AppError::BadRequest(err.to_string()),
            GeocodeError::Failed { .. } => AppError::GeocodeFailed(err.to_string()),
            GeocodeError::Upstream { .. } => AppError::Upstream(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::ErrorContext;

    #[test]
    fn test_repository_errors_map_to_status() {
        let not_found: AppError = RepositoryError::not_found("School not found").into();
        assert!(matches!(&not_found, AppError::NotFound(msg) if msg == "School not found"));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid: AppError =
            RepositoryError::validation("limit must be between 1 and 200").into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let query: AppError = RepositoryError::query_with_context(
            "relation \"schools\" does not exist",
            ErrorContext::new("nearby_schools"),
        )
        .into();
        assert_eq!(query.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_geocode_errors_map_to_status() {
        let cases = [
            (GeocodeError::MissingApiKey, StatusCode::INTERNAL_SERVER_ERROR),
            (GeocodeError::EmptyAddress, StatusCode::BAD_REQUEST),
            (
                GeocodeError::Failed {
                    status: "ZERO_RESULTS".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                GeocodeError::Upstream {
                    message: "timed out".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn test_repository_failure_body_hides_store_internals() {
        let err: AppError = RepositoryError::query_with_context(
            "relation \"schools\" does not exist",
            ErrorContext::new("nearby_schools").with_details("db_error_kind=Unknown"),
        )
        .into();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            body,
            serde_json::json!({ "code": "REPOSITORY_ERROR", "message": "Database error" })
        );
    }

    #[test]
    fn test_details_are_omitted_when_absent() {
        let json = serde_json::to_value(ApiError::new("NOT_FOUND", "School not found")).unwrap();
        assert!(json.get("details").is_none());
    }
}

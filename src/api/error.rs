//! API error response types

use crate::error::ServerError;
use axum::{
    response::{IntoResponse, Response},
    Json,
};

/// API error response body
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code
    pub code: String,

    /// Whether the error is recoverable (client can retry)
    pub recoverable: bool,

    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // server-side failures get a generic body; the detail goes to
        // the log, not the client
        let error = if self.is_user_facing() {
            self.to_string()
        } else {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
            "internal server error".to_string()
        };

        let body = ErrorResponse {
            error,
            code: self.error_code().to_string(),
            recoverable: self.is_recoverable(),
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use axum::{body::to_bytes, http::StatusCode};

    #[test]
    fn test_error_response_serialization_without_details() {
        let response = ErrorResponse {
            error: "test error message".to_string(),
            code: "TEST_ERROR".to_string(),
            recoverable: false,
            details: None,
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"], "test error message");
        assert_eq!(json["code"], "TEST_ERROR");
        assert_eq!(json["recoverable"], false);
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_user_facing_error_keeps_message() {
        let response = ServerError::EmailInUse("a@x.com".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "email already used: a@x.com");
        assert_eq!(body["code"], "EMAIL_IN_USE");
        assert_eq!(body["recoverable"], false);
    }

    #[tokio::test]
    async fn test_internal_error_message_is_generic() {
        let response =
            ServerError::Store(StoreError::Unavailable("/var/data/db.json".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal server error");
        assert_eq!(body["code"], "STORAGE_ERROR");
        assert_eq!(body["recoverable"], true);
        // the path must not leak
        assert!(!body.to_string().contains("/var/data"));
    }
}

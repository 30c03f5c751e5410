//! Server error types

use axum::http::StatusCode;
use thiserror::Error;

/// Main server error type
#[derive(Debug, Error)]
pub enum ServerError {
    // ========== Validation Errors ==========
    /// Missing or malformed input
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // ========== Authentication Errors ==========
    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing authorization header
    #[error("authorization required")]
    AuthMissing,

    /// Invalid or expired bearer token
    #[error("invalid authorization token")]
    AuthInvalid,

    // ========== Authorization Errors ==========
    /// Caller is authenticated but has no active subscription
    #[error("requires active subscription")]
    SubscriptionRequired,

    // ========== Resource Errors ==========
    /// Resource absent for this caller (also covers foreign-owned rows)
    #[error("not found: {0}")]
    NotFound(String),

    /// Email already registered
    #[error("email already used: {0}")]
    EmailInUse(String),

    // ========== Webhook Errors ==========
    /// Webhook signature verification failed
    #[error("invalid webhook signature: {0}")]
    InvalidSignature(String),

    // ========== External Collaborators ==========
    /// Billing provider call failed
    #[error("billing provider error: {0}")]
    Billing(String),

    // ========== Storage Errors ==========
    /// Record store failure
    #[error("storage error: {0}")]
    Store(StoreError),

    // ========== Server Errors ==========
    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Record-store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing document unreachable
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Backing document exists but cannot be parsed
    #[error("store corrupt: {0}")]
    Corrupt(String),

    /// Duplicate email on account creation
    #[error("duplicate email: {0}")]
    DuplicateEmail(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Server result type alias
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ServerError::InvalidArgument(_) | ServerError::InvalidSignature(_) => {
                StatusCode::BAD_REQUEST
            }

            // 401 Unauthorized
            ServerError::InvalidCredentials
            | ServerError::AuthMissing
            | ServerError::AuthInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            ServerError::SubscriptionRequired => StatusCode::FORBIDDEN,

            // 404 Not Found
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            ServerError::EmailInUse(_) => StatusCode::CONFLICT,

            // 502 Bad Gateway
            ServerError::Billing(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            ServerError::Store(_) | ServerError::Internal(_) | ServerError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code for API response
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ServerError::InvalidCredentials => "INVALID_CREDENTIALS",
            ServerError::AuthMissing => "AUTH_MISSING",
            ServerError::AuthInvalid => "AUTH_INVALID",
            ServerError::SubscriptionRequired => "SUBSCRIPTION_REQUIRED",
            ServerError::NotFound(_) => "NOT_FOUND",
            ServerError::EmailInUse(_) => "EMAIL_IN_USE",
            ServerError::InvalidSignature(_) => "INVALID_SIGNATURE",
            ServerError::Billing(_) => "BILLING_ERROR",
            ServerError::Store(_) => "STORAGE_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Check if error is recoverable (client can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ServerError::Billing(_) | ServerError::Store(StoreError::Unavailable(_))
        )
    }

    /// Whether the response body may carry the error message verbatim.
    ///
    /// Storage/internal/external failures return a generic indication
    /// instead of leaking internal detail.
    pub fn is_user_facing(&self) -> bool {
        !self.status_code().is_server_error()
    }
}

// Conversions from external errors

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail(email) => ServerError::EmailInUse(email),
            other => ServerError::Store(other),
        }
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(e: serde_json::Error) -> Self {
        ServerError::InvalidArgument(e.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ServerError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        ServerError::AuthInvalid
    }
}

impl From<bcrypt::BcryptError> for ServerError {
    fn from(e: bcrypt::BcryptError) -> Self {
        ServerError::Internal(format!("password hashing: {}", e))
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(e: reqwest::Error) -> Self {
        ServerError::Billing(e.to_string())
    }
}

//! Request extractors

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::api::state::AppState;
use crate::error::ServerError;

/// The authenticated caller, taken from the `Authorization: Bearer`
/// header.
///
/// Handlers that take `AuthAccount` reject unauthenticated requests
/// with 401. Handlers that take `Option<AuthAccount>` treat a missing
/// or invalid token as an anonymous caller.
#[derive(Debug, Clone)]
pub struct AuthAccount {
    pub id: u64,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthAccount {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(ServerError::AuthMissing)?;
        let value = header.to_str().map_err(|_| ServerError::AuthInvalid)?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(ServerError::AuthInvalid)?;

        let claims = state.tokens.verify(token.trim())?;
        Ok(AuthAccount {
            id: claims.sub,
            email: claims.email,
        })
    }
}

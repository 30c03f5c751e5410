//! Signup, login, and the current-account view

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::info;

use crate::api::dto::request::CredentialsRequest;
use crate::api::dto::response::{AccountSummary, AuthResponse, MeResponse};
use crate::api::extract::AuthAccount;
use crate::api::state::AppState;
use crate::auth::password;
use crate::error::{ServerError, ServerResult};

/// `POST /api/signup`
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> ServerResult<Json<AuthResponse>> {
    let (email, plain) = request.into_parts()?;

    let password_hash = password::hash(&plain).await?;
    let account = state.store.create_account(&email, &password_hash).await?;
    let token = state.tokens.issue(&account)?;

    info!(account_id = account.id, "account created");
    Ok(Json(AuthResponse {
        token,
        account: AccountSummary::from(&account),
    }))
}

/// `POST /api/login`
///
/// Unknown email and wrong password produce the same response, so the
/// endpoint cannot be used to probe registered addresses.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> ServerResult<Json<AuthResponse>> {
    let (email, plain) = request.into_parts()?;

    let account = state
        .store
        .find_account_by_email(&email)
        .await?
        .ok_or(ServerError::InvalidCredentials)?;
    if !password::verify(&plain, &account.password_hash).await? {
        return Err(ServerError::InvalidCredentials);
    }

    let token = state.tokens.issue(&account)?;
    info!(account_id = account.id, "login");
    Ok(Json(AuthResponse {
        token,
        account: AccountSummary::from(&account),
    }))
}

/// `GET /api/me`
pub async fn me(
    State(state): State<Arc<AppState>>,
    caller: AuthAccount,
) -> ServerResult<Json<MeResponse>> {
    let account = state
        .store
        .find_account_by_id(caller.id)
        .await?
        .ok_or(ServerError::AuthInvalid)?;
    let subscriptions = state.store.subscriptions_for_account(account.id).await?;

    Ok(Json(MeResponse {
        account: AccountSummary::from(&account),
        subscriptions,
    }))
}

//! Saved-search alerts

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use tracing::info;

use crate::api::dto::request::CreateAlertRequest;
use crate::api::dto::response::{AlertResponse, AlertsResponse, DeletedResponse};
use crate::api::extract::AuthAccount;
use crate::api::state::AppState;
use crate::error::{ServerError, ServerResult};

/// `POST /api/alerts` (requires an active subscription)
pub async fn create_alert(
    State(state): State<Arc<AppState>>,
    caller: AuthAccount,
    Json(request): Json<CreateAlertRequest>,
) -> ServerResult<Json<AlertResponse>> {
    if !state.store.is_entitled(caller.id).await? {
        return Err(ServerError::SubscriptionRequired);
    }
    let criteria = request.into_criteria()?;

    let alert = state.store.create_alert(caller.id, criteria).await?;
    info!(account_id = caller.id, alert_id = alert.id, "alert created");
    Ok(Json(AlertResponse { alert }))
}

/// `GET /api/alerts`
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    caller: AuthAccount,
) -> ServerResult<Json<AlertsResponse>> {
    let alerts = state.store.alerts_for_account(caller.id).await?;
    Ok(Json(AlertsResponse { alerts }))
}

/// `DELETE /api/alerts/:id`
///
/// Foreign-owned alerts are indistinguishable from absent ones.
pub async fn delete_alert(
    State(state): State<Arc<AppState>>,
    caller: AuthAccount,
    Path(alert_id): Path<u64>,
) -> ServerResult<Json<DeletedResponse>> {
    state
        .store
        .delete_alert(alert_id, caller.id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("alert {alert_id}")))?;

    info!(account_id = caller.id, alert_id, "alert deleted");
    Ok(Json(DeletedResponse {
        success: true,
        message: "Alert deleted".to_string(),
    }))
}

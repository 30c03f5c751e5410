//! Deal history
//!
//! Saved computation snapshots. Requires authentication but no
//! subscription: history works for free accounts.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use tracing::info;

use crate::api::dto::request::{CreateDealRequest, UpdateDealRequest};
use crate::api::dto::response::{DealResponse, DealsResponse};
use crate::api::extract::AuthAccount;
use crate::api::state::AppState;
use crate::error::{ServerError, ServerResult};
use crate::store::NewDealRecord;

/// `POST /api/deals`
pub async fn create_deal(
    State(state): State<Arc<AppState>>,
    caller: AuthAccount,
    Json(request): Json<CreateDealRequest>,
) -> ServerResult<Json<DealResponse>> {
    let (Some(input), Some(metrics)) = (request.input, request.metrics) else {
        return Err(ServerError::InvalidArgument(
            "input and metrics are required".into(),
        ));
    };

    let deal = state
        .store
        .create_deal(NewDealRecord {
            account_id: caller.id,
            title: request.title,
            location: request.location,
            input,
            metrics,
            tags: request.tags,
            note: request.note,
        })
        .await?;

    info!(account_id = caller.id, deal_id = deal.id, "deal saved");
    Ok(Json(DealResponse { deal }))
}

/// `GET /api/deals`
pub async fn list_deals(
    State(state): State<Arc<AppState>>,
    caller: AuthAccount,
) -> ServerResult<Json<DealsResponse>> {
    let deals = state.store.deals_for_account(caller.id).await?;
    Ok(Json(DealsResponse { deals }))
}

/// `PATCH /api/deals/:id` (tags and note only)
pub async fn update_deal(
    State(state): State<Arc<AppState>>,
    caller: AuthAccount,
    Path(deal_id): Path<u64>,
    Json(request): Json<UpdateDealRequest>,
) -> ServerResult<Json<DealResponse>> {
    let deal = state
        .store
        .update_deal(caller.id, deal_id, request.tags, request.note)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("deal {deal_id}")))?;

    Ok(Json(DealResponse { deal }))
}

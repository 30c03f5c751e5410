//! Billing webhook receiver
//!
//! Verifies the provider signature over the raw body, then hands the
//! event to the reconciler. Processing failures are logged but still
//! acknowledged: the provider retries on non-2xx, and a poison event
//! must not wedge the whole delivery queue.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use tracing::{error, warn};

use crate::api::dto::response::WebhookAck;
use crate::api::state::AppState;
use crate::billing::{signature, WebhookEvent};
use crate::error::{ServerError, ServerResult};

/// `POST /api/webhook`
pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Json<WebhookAck>> {
    let Some(secret) = &state.config.billing.webhook_secret else {
        // dev convenience: without a secret nothing can be trusted, so
        // the event is acknowledged and dropped
        warn!("no webhook secret configured; accepting event without verification");
        return Ok(Json(WebhookAck { received: true }));
    };

    let header = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServerError::InvalidSignature("missing signature header".into()))?;
    signature::verify(&body, header, secret, Utc::now().timestamp())?;

    let event = WebhookEvent::parse(&body)?;
    if let Err(e) = state.reconciler.apply(&event).await {
        error!(kind = %event.kind, error = %e, "webhook event processing failed");
    }

    Ok(Json(WebhookAck { received: true }))
}

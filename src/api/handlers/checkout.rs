//! Hosted checkout sessions
//!
//! Opens a session with the billing provider. When no price id is
//! configured, or the provider call fails, development servers degrade
//! to a simulated session that immediately activates a subscription
//! for authenticated callers; production servers fail hard.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use tracing::{info, warn};

use crate::api::dto::request::{CheckoutSessionRequest, SessionQuery};
use crate::api::dto::response::CheckoutSessionResponse;
use crate::api::extract::AuthAccount;
use crate::api::state::AppState;
use crate::billing::CheckoutParams;
use crate::config::{BillingPeriod, Plan};
use crate::error::{ServerError, ServerResult};
use crate::store::SubscriptionUpsert;

/// `POST /api/create-checkout-session`
///
/// Authentication is optional: anonymous visitors can reach checkout,
/// but only authenticated callers get a customer link and (in the dev
/// fallback) an immediate subscription.
pub async fn create_checkout_session(
    State(state): State<Arc<AppState>>,
    caller: Option<AuthAccount>,
    Json(request): Json<CheckoutSessionRequest>,
) -> ServerResult<Json<CheckoutSessionResponse>> {
    let (plan, period) = request.into_parts()?;

    let Some(price_id) = state.config.billing.price_id(plan, period) else {
        if state.config.environment.is_production() {
            return Err(ServerError::Config(format!(
                "no price id configured for {}/{}",
                plan.as_str(),
                period.as_str()
            )));
        }
        let url = simulated_session(&state, caller.as_ref(), plan, period, "dev_fake").await?;
        return Ok(Json(CheckoutSessionResponse { url }));
    };
    let price_id = price_id.to_string();

    match live_session(&state, caller.as_ref(), plan, period, price_id).await {
        Ok(url) => Ok(Json(CheckoutSessionResponse { url })),
        Err(e) if !state.config.environment.is_production() => {
            warn!(error = %e, "provider checkout failed, falling back to simulated session");
            let url =
                simulated_session(&state, caller.as_ref(), plan, period, "dev_error_fallback")
                    .await?;
            Ok(Json(CheckoutSessionResponse { url }))
        }
        Err(e) => Err(e),
    }
}

async fn live_session(
    state: &AppState,
    caller: Option<&AuthAccount>,
    plan: Plan,
    period: BillingPeriod,
    price_id: String,
) -> ServerResult<String> {
    // authenticated callers get a provider customer, created on first use
    let mut customer_ref = None;
    if let Some(caller) = caller {
        let account = state
            .store
            .find_account_by_id(caller.id)
            .await?
            .ok_or(ServerError::AuthInvalid)?;
        customer_ref = match account.billing_customer_ref {
            Some(existing) => Some(existing),
            None => {
                let created = state.billing.create_customer(&account.email).await?;
                state
                    .store
                    .set_billing_customer_ref(account.id, &created)
                    .await?;
                Some(created)
            }
        };
    }

    let session = state
        .billing
        .create_checkout_session(CheckoutParams {
            price_id,
            plan,
            billing_period: period,
            success_url: format!(
                "{}/success?session_id={{CHECKOUT_SESSION_ID}}",
                state.config.frontend_url
            ),
            cancel_url: format!("{}/cancel", state.config.frontend_url),
            customer_ref,
            account_id: caller.map(|c| c.id),
        })
        .await?;

    info!(session = %session.id, "hosted checkout session opened");
    Ok(session.url)
}

/// Simulated checkout for development servers without provider access
async fn simulated_session(
    state: &AppState,
    caller: Option<&AuthAccount>,
    plan: Plan,
    period: BillingPeriod,
    prefix: &str,
) -> ServerResult<String> {
    let now = Utc::now().timestamp_millis();
    let nonce = rand::random::<u16>() % 1000;
    let session_id = format!("{prefix}_sess_{now}_{nonce}");

    if let Some(caller) = caller {
        // activate immediately so the local checkout flow completes
        state
            .store
            .upsert_subscription(SubscriptionUpsert {
                account_id: caller.id,
                billing_subscription_ref: format!("{prefix}_sub_{now}_{nonce}"),
                plan: Some(plan.as_str().to_string()),
                billing_period: Some(period.as_str().to_string()),
                status: "active".to_string(),
            })
            .await?;

        let account = state.store.find_account_by_id(caller.id).await?;
        if let Some(account) = account {
            if account.billing_customer_ref.is_none() {
                state
                    .store
                    .set_billing_customer_ref(caller.id, &format!("dev_cust_{now}"))
                    .await?;
            }
        }
        info!(account_id = caller.id, "simulated checkout activated subscription");
    }

    Ok(format!(
        "{}/success?session_id={}",
        state.config.frontend_url, session_id
    ))
}

/// `GET /api/session?session_id=`
///
/// Proxies the provider's view of a completed session back to the
/// frontend success page.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> ServerResult<Json<serde_json::Value>> {
    let session = state
        .billing
        .retrieve_checkout_session(&query.session_id)
        .await?;
    Ok(Json(session))
}

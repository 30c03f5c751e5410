//! Router setup and configuration

use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::api::handlers;
use crate::api::state::AppState;

/// Create the API router
///
/// All routes live under `/api`. Per-route authentication is handled
/// by the extractors, not a blanket middleware: the webhook and
/// checkout endpoints must accept unauthenticated callers.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health_check))
        // identity
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/me", get(handlers::me))
        // billing
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        .route("/session", get(handlers::get_session))
        .route("/webhook", post(handlers::receive_webhook))
        // alerts
        .route("/alerts", post(handlers::create_alert).get(handlers::list_alerts))
        .route("/alerts/:id", delete(handlers::delete_alert))
        // deal history
        .route("/deals", post(handlers::create_deal).get(handlers::list_deals))
        .route("/deals/:id", patch(handlers::update_deal))
        // gated analysis
        .route("/analysis/advanced", get(handlers::advanced_analysis));

    Router::new().nest("/api", api).with_state(state)
}

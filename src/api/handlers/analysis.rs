//! Advanced analysis (subscription-gated)

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::api::dto::response::{AnalysisReport, AnalysisResponse};
use crate::api::extract::AuthAccount;
use crate::api::state::AppState;
use crate::error::{ServerError, ServerResult};

/// `GET /api/analysis/advanced`
///
/// Placeholder payload; the real report generation lives in the
/// frontend's premium views for now.
pub async fn advanced_analysis(
    State(state): State<Arc<AppState>>,
    caller: AuthAccount,
) -> ServerResult<Json<AnalysisResponse>> {
    if !state.store.is_entitled(caller.id).await? {
        return Err(ServerError::SubscriptionRequired);
    }

    Ok(Json(AnalysisResponse {
        report: AnalysisReport {
            phrases: vec![
                "Projection long terme".to_string(),
                "Scénarios avancés".to_string(),
                "Alertes similaires".to_string(),
            ],
            timestamp: Utc::now().timestamp_millis(),
        },
    }))
}

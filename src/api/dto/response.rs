//! API response types

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::{Account, Alert, DealRecord, Subscription};

/// Account fields safe to return to the client
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub id: u64,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_customer_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            billing_customer_ref: account.billing_customer_ref.clone(),
            created_at: account.created_at,
        }
    }
}

/// `POST /api/signup` and `POST /api/login`
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub account: AccountSummary,
}

/// `GET /api/me`
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub account: AccountSummary,
    /// Newest first
    pub subscriptions: Vec<Subscription>,
}

/// `POST /api/create-checkout-session`
#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub url: String,
}

/// `POST /api/webhook`
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// `POST /api/alerts`
#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub alert: Alert,
}

/// `GET /api/alerts`
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
}

/// `DELETE /api/alerts/:id`
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub message: String,
}

/// `POST /api/deals` and `PATCH /api/deals/:id`
#[derive(Debug, Serialize)]
pub struct DealResponse {
    pub deal: DealRecord,
}

/// `GET /api/deals`
#[derive(Debug, Serialize)]
pub struct DealsResponse {
    pub deals: Vec<DealRecord>,
}

/// `GET /api/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// `GET /api/analysis/advanced`
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub report: AnalysisReport,
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub phrases: Vec<String>,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_summary_omits_password_hash() {
        let account = Account {
            id: 1,
            email: "a@x.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            billing_customer_ref: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&AccountSummary::from(&account)).unwrap();
        assert!(json.contains("a@x.com"));
        assert!(!json.contains("secret"));
        // unset customer ref is omitted entirely
        assert!(!json.contains("billing_customer_ref"));
    }
}

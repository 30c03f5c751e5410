//! API request types
//!
//! Required fields are declared `Option` and validated by hand so a
//! missing field yields a 400 with our error body rather than a
//! deserialization rejection.

use serde::Deserialize;

use crate::config::{BillingPeriod, Plan};
use crate::error::{ServerError, ServerResult};

/// Body of `POST /api/signup` and `POST /api/login`
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Validate presence of both fields
    pub fn into_parts(self) -> ServerResult<(String, String)> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(ServerError::InvalidArgument(
                "email and password are required".into(),
            )),
        }
    }
}

/// Body of `POST /api/create-checkout-session`
#[derive(Debug, Deserialize)]
pub struct CheckoutSessionRequest {
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub billing: Option<String>,
}

impl CheckoutSessionRequest {
    /// Validate the plan/billing pair
    pub fn into_parts(self) -> ServerResult<(Plan, BillingPeriod)> {
        let plan = self
            .plan
            .as_deref()
            .and_then(Plan::parse)
            .ok_or_else(|| ServerError::InvalidArgument("invalid plan or billing".into()))?;
        let period = self
            .billing
            .as_deref()
            .and_then(BillingPeriod::parse)
            .ok_or_else(|| ServerError::InvalidArgument("invalid plan or billing".into()))?;
        Ok((plan, period))
    }
}

/// Query of `GET /api/session`
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

/// Body of `POST /api/alerts`
#[derive(Debug, Deserialize)]
pub struct CreateAlertRequest {
    #[serde(default)]
    pub criteria: Option<serde_json::Value>,
}

impl CreateAlertRequest {
    pub fn into_criteria(self) -> ServerResult<serde_json::Value> {
        match self.criteria {
            Some(criteria) if !criteria.is_null() => Ok(criteria),
            _ => Err(ServerError::InvalidArgument("criteria is required".into())),
        }
    }
}

/// Body of `POST /api/deals`
#[derive(Debug, Deserialize)]
pub struct CreateDealRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub input: Option<serde_json::Value>,
    #[serde(default)]
    pub metrics: Option<serde_json::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub note: String,
}

/// Body of `PATCH /api/deals/:id`; absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateDealRequest {
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub note: Option<String>,
}

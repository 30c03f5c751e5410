//! Billing provider gateway
//!
//! Thin client over the provider's REST API: create customers, open
//! hosted checkout sessions, retrieve completed sessions. Behind a
//! trait so handlers and tests can swap in a stub.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::{BillingPeriod, Plan};
use crate::error::{ServerError, ServerResult};

/// Parameters for opening a hosted checkout session
#[derive(Debug, Clone)]
pub struct CheckoutParams {
    pub price_id: String,
    pub plan: Plan,
    pub billing_period: BillingPeriod,
    pub success_url: String,
    pub cancel_url: String,
    /// Provider customer to attach, when the caller is known
    pub customer_ref: Option<String>,
    /// Our account id, embedded in session metadata for the reconciler
    pub account_id: Option<u64>,
}

/// A provider-hosted checkout session
#[derive(Debug, Clone, Deserialize)]
pub struct HostedSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Create a provider customer for an email, returning its reference
    async fn create_customer(&self, email: &str) -> ServerResult<String>;

    /// Open a hosted checkout session
    async fn create_checkout_session(&self, params: CheckoutParams) -> ServerResult<HostedSession>;

    /// Retrieve a checkout session with its subscription and customer
    /// expanded, as raw provider JSON
    async fn retrieve_checkout_session(&self, session_id: &str)
        -> ServerResult<serde_json::Value>;
}

const API_BASE: &str = "https://api.stripe.com/v1";

/// HTTP gateway to the real provider
pub struct StripeGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(secret_key: String) -> Self {
        Self::with_base_url(secret_key, API_BASE.to_string())
    }

    /// Point the gateway at a different base URL (local stub servers)
    pub fn with_base_url(secret_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            secret_key,
        }
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> ServerResult<T> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ServerResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServerError::Billing(format!(
                "provider returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }
        let value = response.json::<T>().await?;
        Ok(value)
    }
}

#[async_trait]
impl BillingProvider for StripeGateway {
    async fn create_customer(&self, email: &str) -> ServerResult<String> {
        #[derive(Deserialize)]
        struct Customer {
            id: String,
        }

        debug!(email = %email, "creating billing customer");
        let customer: Customer = self
            .post_form("/customers", &[("email".to_string(), email.to_string())])
            .await?;
        Ok(customer.id)
    }

    async fn create_checkout_session(&self, params: CheckoutParams) -> ServerResult<HostedSession> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "subscription".into()),
            ("line_items[0][price]".into(), params.price_id),
            ("line_items[0][quantity]".into(), "1".into()),
            ("success_url".into(), params.success_url),
            ("cancel_url".into(), params.cancel_url),
            ("metadata[plan]".into(), params.plan.as_str().into()),
            ("metadata[billing]".into(), params.billing_period.as_str().into()),
            (
                "metadata[account_id]".into(),
                params.account_id.map(|id| id.to_string()).unwrap_or_default(),
            ),
        ];
        if let Some(customer_ref) = params.customer_ref {
            form.push(("customer".into(), customer_ref));
        }

        debug!("opening hosted checkout session");
        self.post_form("/checkout/sessions", &form).await
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> ServerResult<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/checkout/sessions/{}", self.base_url, session_id))
            .bearer_auth(&self.secret_key)
            .query(&[("expand[]", "subscription"), ("expand[]", "customer")])
            .send()
            .await?;
        Self::decode(response).await
    }
}

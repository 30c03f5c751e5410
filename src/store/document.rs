//! The persisted document and its record types
//!
//! All four collections live in one JSON document. Uniqueness and
//! relations are enforced here in application logic, not by a schema
//! engine. New optional fields must default so old documents stay
//! readable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statuses that grant entitlement to gated features
pub const ENTITLED_STATUSES: [&str; 2] = ["active", "trialing"];

/// Registered user identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    /// Always stored lowercased; unique across the collection
    pub email: String,
    pub password_hash: String,
    /// Billing-provider customer reference, set lazily on first checkout
    /// or when a webhook links the customer
    #[serde(default)]
    pub billing_customer_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Local mirror of one external billing subscription's lifecycle state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: u64,
    pub account_id: u64,
    /// Provider-side subscription reference; at most one row per ref
    pub billing_subscription_ref: String,
    #[serde(default)]
    pub plan: Option<String>,
    /// "month" or "year" as reported by the provider
    #[serde(default)]
    pub billing_period: Option<String>,
    /// Provider-reported status string, copied verbatim (last event wins)
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Whether this row's status grants entitlement
    pub fn is_entitling(&self) -> bool {
        ENTITLED_STATUSES.contains(&self.status.as_str())
    }
}

/// Saved search criteria that periodically triggers notification attempts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub account_id: u64,
    /// Opaque to the server; stored and returned as submitted
    pub criteria: serde_json::Value,
    /// Counts notification *attempts*, not confirmed deliveries
    #[serde(default)]
    pub notifications_sent: u32,
    pub created_at: DateTime<Utc>,
}

/// Saved snapshot of a property's computed investment metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealRecord {
    pub id: u64,
    pub account_id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Computation inputs, opaque to the server
    pub input: serde_json::Value,
    /// Computed outputs, opaque to the server
    pub metrics: serde_json::Value,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full persisted state: four collections in one document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub deals: Vec<DealRecord>,
}

impl Document {
    /// Next id for a collection: `1 + max(existing ids)`, or 1 when empty.
    ///
    /// Deleting the highest-id record lets the id be reused on the next
    /// insert. That quirk is part of the persisted format and is kept.
    pub fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
        ids.max().map_or(1, |max| max + 1)
    }

    pub fn next_account_id(&self) -> u64 {
        Self::next_id(self.accounts.iter().map(|a| a.id))
    }

    pub fn next_subscription_id(&self) -> u64 {
        Self::next_id(self.subscriptions.iter().map(|s| s.id))
    }

    pub fn next_alert_id(&self) -> u64 {
        Self::next_id(self.alerts.iter().map(|a| a.id))
    }

    pub fn next_deal_id(&self) -> u64 {
        Self::next_id(self.deals.iter().map(|d| d.id))
    }

    // ========== Read-only projections ==========

    pub fn account_by_id(&self, id: u64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Lookup by email, matching the stored lowercase form
    pub fn account_by_email(&self, email: &str) -> Option<&Account> {
        let email = email.to_lowercase();
        self.accounts.iter().find(|a| a.email == email)
    }

    pub fn account_by_customer_ref(&self, customer_ref: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.billing_customer_ref.as_deref() == Some(customer_ref))
    }

    pub fn subscription_by_ref(&self, billing_ref: &str) -> Option<&Subscription> {
        self.subscriptions
            .iter()
            .find(|s| s.billing_subscription_ref == billing_ref)
    }

    /// Subscription rows for an account, newest `created_at` first.
    /// Ties keep insertion order (stable sort), so the later-inserted
    /// row sorts after the earlier one and "first" means newest.
    pub fn subscriptions_for_account(&self, account_id: u64) -> Vec<Subscription> {
        let mut subs: Vec<Subscription> = self
            .subscriptions
            .iter()
            .filter(|s| s.account_id == account_id)
            .cloned()
            .collect();
        subs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        subs
    }

    pub fn alerts_for_account(&self, account_id: u64) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .iter()
            .filter(|a| a.account_id == account_id)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        alerts
    }

    pub fn deals_for_account(&self, account_id: u64) -> Vec<DealRecord> {
        let mut deals: Vec<DealRecord> = self
            .deals
            .iter()
            .filter(|d| d.account_id == account_id)
            .cloned()
            .collect();
        deals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        deals
    }
}

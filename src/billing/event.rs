//! Webhook event payloads
//!
//! Events arrive as `{type, data: {object}}`. The object is kept as a
//! raw value until the event kind is known, then decoded into the
//! typed shapes below. Provider objects may reference related records
//! either by bare id string or as an expanded object; [`ObjectRef`]
//! absorbs both.

use serde::Deserialize;

use crate::error::ServerResult;

/// One webhook delivery
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> ServerResult<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// A related record: bare id or expanded object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ObjectRef {
    Id(String),
    Expanded { id: String },
}

impl ObjectRef {
    pub fn id(&self) -> &str {
        match self {
            ObjectRef::Id(id) | ObjectRef::Expanded { id } => id,
        }
    }
}

/// Metadata attached to hosted checkout sessions at creation time
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionMetadata {
    /// Our account id, stringified
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub billing: Option<String>,
}

impl SessionMetadata {
    pub fn account_id(&self) -> Option<u64> {
        self.account_id.as_deref().and_then(|s| s.parse().ok())
    }
}

/// `checkout.session.completed` payload
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub customer: Option<ObjectRef>,
    #[serde(default)]
    pub subscription: Option<SubscriptionRef>,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

/// Subscription attached to a checkout session: id-only in the raw
/// event, expanded when the session was retrieved with expansion
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubscriptionRef {
    Id(String),
    Expanded(SubscriptionObject),
}

impl SubscriptionRef {
    pub fn id(&self) -> &str {
        match self {
            SubscriptionRef::Id(id) => id,
            SubscriptionRef::Expanded(sub) => &sub.id,
        }
    }

    pub fn expanded(&self) -> Option<&SubscriptionObject> {
        match self {
            SubscriptionRef::Id(_) => None,
            SubscriptionRef::Expanded(sub) => Some(sub),
        }
    }
}

/// `customer.subscription.*` payload
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionObject {
    pub id: String,
    #[serde(default)]
    pub customer: Option<ObjectRef>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: SubscriptionItems,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    #[serde(default)]
    pub price: Option<Price>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub recurring: Option<Recurring>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recurring {
    #[serde(default)]
    pub interval: Option<String>,
}

impl SubscriptionObject {
    /// Plan identifier from the first line item's price product
    pub fn plan(&self) -> Option<String> {
        self.items
            .data
            .first()
            .and_then(|item| item.price.as_ref())
            .and_then(|price| price.product.clone())
    }

    /// Billing interval ("month"/"year") from the first line item
    pub fn interval(&self) -> Option<String> {
        self.items
            .data
            .first()
            .and_then(|item| item.price.as_ref())
            .and_then(|price| price.recurring.as_ref())
            .and_then(|recurring| recurring.interval.clone())
    }
}

//! Persistent record store
//!
//! A single JSON document holds accounts, subscriptions, alerts, and
//! deal records. [`document`] defines the persisted shapes and pure
//! projections over them; [`json`] is the file-backed store that
//! serializes mutations.

pub mod document;
pub mod json;

pub use document::{Account, Alert, DealRecord, Document, Subscription, ENTITLED_STATUSES};
pub use json::{JsonStore, NewDealRecord, PendingAlert, SubscriptionUpsert};

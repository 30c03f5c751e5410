//! Billing integration
//!
//! [`provider`] talks to the external billing API, [`signature`]
//! authenticates webhook deliveries, [`event`] decodes their payloads,
//! and [`reconciler`] folds them into the local subscription mirror.

pub mod event;
pub mod provider;
pub mod reconciler;
pub mod signature;

pub use event::WebhookEvent;
pub use provider::{BillingProvider, CheckoutParams, HostedSession, StripeGateway};
pub use reconciler::Reconciler;

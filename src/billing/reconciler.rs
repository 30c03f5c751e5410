//! Webhook event reconciliation
//!
//! Applies billing lifecycle events to the local subscription mirror.
//! Events are processed from their payload alone; nothing is fetched
//! back from the provider. Application is idempotent per subscription
//! reference, last event wins. Events that cannot be resolved to a
//! local account are logged and dropped.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::event::{CheckoutSession, SubscriptionObject, WebhookEvent};
use crate::error::ServerResult;
use crate::store::{Account, JsonStore, SubscriptionUpsert};

pub struct Reconciler {
    store: Arc<JsonStore>,
}

impl Reconciler {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }

    /// Apply one event. Unknown kinds are acknowledged without effect.
    pub async fn apply(&self, event: &WebhookEvent) -> ServerResult<()> {
        match event.kind.as_str() {
            "checkout.session.completed" => {
                let session: CheckoutSession =
                    serde_json::from_value(event.data.object.clone())?;
                self.apply_checkout_completed(session).await
            }
            "customer.subscription.created" | "customer.subscription.updated" => {
                let sub: SubscriptionObject = serde_json::from_value(event.data.object.clone())?;
                self.apply_subscription_change(sub, None).await
            }
            "customer.subscription.deleted" => {
                let mut sub: SubscriptionObject =
                    serde_json::from_value(event.data.object.clone())?;
                // deletion clears plan detail and forces the terminal status
                sub.items.data.clear();
                self.apply_subscription_change(sub, Some("canceled")).await
            }
            "invoice.payment_succeeded" => {
                info!(
                    invoice = %event.data.object["id"].as_str().unwrap_or("?"),
                    "invoice payment succeeded"
                );
                Ok(())
            }
            other => {
                debug!(kind = %other, "ignoring unhandled webhook event");
                Ok(())
            }
        }
    }

    async fn apply_checkout_completed(&self, session: CheckoutSession) -> ServerResult<()> {
        info!(session = %session.id, "checkout session completed");

        let account = self.resolve_checkout_account(&session).await?;
        let Some(account) = account else {
            warn!(session = %session.id, "checkout session resolves to no account, dropping");
            return Ok(());
        };

        if let Some(sub) = &session.subscription {
            let expanded = sub.expanded();
            // session metadata wins; expanded line items are the fallback
            let plan = session
                .metadata
                .plan
                .clone()
                .or_else(|| expanded.and_then(SubscriptionObject::plan));
            let billing_period = session
                .metadata
                .billing
                .clone()
                .or_else(|| expanded.and_then(SubscriptionObject::interval));
            let status = expanded
                .and_then(|s| s.status.clone())
                .unwrap_or_else(|| "active".to_string());

            self.upsert(SubscriptionUpsert {
                account_id: account.id,
                billing_subscription_ref: sub.id().to_string(),
                plan,
                billing_period,
                status,
            })
            .await?;
        }

        if let Some(customer) = &session.customer {
            if account.billing_customer_ref.is_none() {
                self.store
                    .set_billing_customer_ref(account.id, customer.id())
                    .await?;
            }
        }

        Ok(())
    }

    /// Shared path for subscription created/updated/deleted
    async fn apply_subscription_change(
        &self,
        sub: SubscriptionObject,
        forced_status: Option<&str>,
    ) -> ServerResult<()> {
        let account_id = match self.resolve_subscription_account(&sub).await? {
            Some(id) => id,
            None => {
                warn!(subscription = %sub.id, "subscription event resolves to no account, dropping");
                return Ok(());
            }
        };

        let status = match forced_status {
            Some(status) => status.to_string(),
            None => match &sub.status {
                Some(status) => status.clone(),
                None => {
                    warn!(subscription = %sub.id, "subscription event carries no status, dropping");
                    return Ok(());
                }
            },
        };

        self.upsert(SubscriptionUpsert {
            account_id,
            billing_subscription_ref: sub.id.clone(),
            plan: sub.plan(),
            billing_period: sub.interval(),
            status,
        })
        .await?;
        Ok(())
    }

    /// Account for a checkout session: session metadata first, then the
    /// customer reference.
    async fn resolve_checkout_account(
        &self,
        session: &CheckoutSession,
    ) -> ServerResult<Option<Account>> {
        if let Some(account_id) = session.metadata.account_id() {
            if let Some(account) = self.store.find_account_by_id(account_id).await? {
                return Ok(Some(account));
            }
            warn!(account_id, "checkout metadata names unknown account");
        }
        if let Some(customer) = &session.customer {
            return Ok(self.store.find_account_by_customer_ref(customer.id()).await?);
        }
        Ok(None)
    }

    /// Account for a subscription event: an existing mirror row for the
    /// same reference wins, else the customer reference.
    async fn resolve_subscription_account(
        &self,
        sub: &SubscriptionObject,
    ) -> ServerResult<Option<u64>> {
        let doc = self.store.read().await?;
        if let Some(existing) = doc.subscription_by_ref(&sub.id) {
            return Ok(Some(existing.account_id));
        }
        if let Some(customer) = &sub.customer {
            return Ok(doc.account_by_customer_ref(customer.id()).map(|a| a.id));
        }
        Ok(None)
    }

    async fn upsert(&self, upsert: SubscriptionUpsert) -> ServerResult<()> {
        let was_entitling = self
            .store
            .read()
            .await?
            .subscription_by_ref(&upsert.billing_subscription_ref)
            .map(|s| s.is_entitling());

        let updated = self.store.upsert_subscription(upsert).await?;

        if was_entitling == Some(true) && !updated.is_entitling() {
            warn!(
                subscription = %updated.billing_subscription_ref,
                account_id = updated.account_id,
                status = %updated.status,
                "subscription left entitling status"
            );
        } else {
            info!(
                subscription = %updated.billing_subscription_ref,
                account_id = updated.account_id,
                status = %updated.status,
                "subscription reconciled"
            );
        }
        Ok(())
    }
}

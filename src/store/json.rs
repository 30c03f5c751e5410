//! JSON-document-backed record store
//!
//! Single source of truth for all four collections. Every logical
//! operation re-reads the backing file, mutates the in-memory copy,
//! and persists a full snapshot. Mutations are serialized through one
//! async mutex so two concurrent operations cannot interleave their
//! read and write phases (whole-document last-writer-wins is thereby
//! reduced to a single-writer queue within this process).

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::Mutex;

use super::document::{Account, Alert, DealRecord, Document, Subscription};
use crate::entitlement;
use crate::error::StoreError;

/// Fields written on a subscription upsert
#[derive(Debug, Clone)]
pub struct SubscriptionUpsert {
    pub account_id: u64,
    pub billing_subscription_ref: String,
    pub plan: Option<String>,
    pub billing_period: Option<String>,
    pub status: String,
}

/// New deal record fields (ids and timestamps are assigned by the store)
#[derive(Debug, Clone)]
pub struct NewDealRecord {
    pub account_id: u64,
    pub title: Option<String>,
    pub location: Option<String>,
    pub input: serde_json::Value,
    pub metrics: serde_json::Value,
    pub tags: Vec<String>,
    pub note: String,
}

/// Alert joined with its owner's email, as needed by the sweep
#[derive(Debug, Clone)]
pub struct PendingAlert {
    pub alert: Alert,
    pub email: String,
}

/// JSON document store
pub struct JsonStore {
    path: PathBuf,
    /// Serializes every read-modify-write cycle
    write_lock: Mutex<()>,
}

impl JsonStore {
    /// Open the store, creating an empty document on first run.
    ///
    /// Fails if the path exists but cannot be read or parsed; callers
    /// treat that as fatal at startup.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        };

        if tokio::fs::try_exists(&store.path).await? {
            // Validate early so corruption fails startup, not a request
            store.load().await?;
        } else {
            store.persist(&Document::default()).await?;
        }

        Ok(store)
    }

    /// Load the full current state from disk
    pub async fn read(&self) -> Result<Document, StoreError> {
        self.load().await
    }

    async fn load(&self) -> Result<Document, StoreError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    async fn persist(&self, doc: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| StoreError::Corrupt(format!("serialize: {}", e)))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.path.display(), e)))
    }

    /// Run one read-modify-write cycle under the store lock
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Document) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let result = f(&mut doc)?;
        self.persist(&doc).await?;
        Ok(result)
    }

    /// Like [`mutate`](Self::mutate), but the closure may decline the
    /// mutation by returning `None`, in which case nothing is written.
    async fn mutate_opt<T>(
        &self,
        f: impl FnOnce(&mut Document) -> Result<Option<T>, StoreError>,
    ) -> Result<Option<T>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        match f(&mut doc)? {
            Some(result) => {
                self.persist(&doc).await?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    // ========== Accounts ==========

    /// Create an account with a unique, lowercased email
    pub async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        let email = email.to_lowercase();
        self.mutate(|doc| {
            if doc.account_by_email(&email).is_some() {
                return Err(StoreError::DuplicateEmail(email.clone()));
            }
            let account = Account {
                id: doc.next_account_id(),
                email: email.clone(),
                password_hash: password_hash.to_string(),
                billing_customer_ref: None,
                created_at: Utc::now(),
            };
            doc.accounts.push(account.clone());
            Ok(account)
        })
        .await
    }

    pub async fn find_account_by_id(&self, id: u64) -> Result<Option<Account>, StoreError> {
        Ok(self.load().await?.account_by_id(id).cloned())
    }

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.load().await?.account_by_email(email).cloned())
    }

    pub async fn find_account_by_customer_ref(
        &self,
        customer_ref: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self.load().await?.account_by_customer_ref(customer_ref).cloned())
    }

    /// Set `billing_customer_ref`; returns the updated account, or None
    /// if the account does not exist
    pub async fn set_billing_customer_ref(
        &self,
        account_id: u64,
        customer_ref: &str,
    ) -> Result<Option<Account>, StoreError> {
        self.mutate_opt(|doc| {
            let Some(account) = doc.accounts.iter_mut().find(|a| a.id == account_id) else {
                return Ok(None);
            };
            account.billing_customer_ref = Some(customer_ref.to_string());
            Ok(Some(account.clone()))
        })
        .await
    }

    // ========== Subscriptions ==========

    pub async fn subscriptions_for_account(
        &self,
        account_id: u64,
    ) -> Result<Vec<Subscription>, StoreError> {
        Ok(self.load().await?.subscriptions_for_account(account_id))
    }

    /// Upsert by `billing_subscription_ref`: overwrite the mutable
    /// fields of an existing row, or append a new row with a fresh id.
    /// History across *different* refs is retained, never overwritten.
    pub async fn upsert_subscription(
        &self,
        upsert: SubscriptionUpsert,
    ) -> Result<Subscription, StoreError> {
        let now = Utc::now();
        self.mutate(move |doc| {
            if let Some(existing) = doc
                .subscriptions
                .iter_mut()
                .find(|s| s.billing_subscription_ref == upsert.billing_subscription_ref)
            {
                existing.status = upsert.status;
                existing.plan = upsert.plan;
                existing.billing_period = upsert.billing_period;
                existing.updated_at = now;
                return Ok(existing.clone());
            }
            let sub = Subscription {
                id: doc.next_subscription_id(),
                account_id: upsert.account_id,
                billing_subscription_ref: upsert.billing_subscription_ref,
                plan: upsert.plan,
                billing_period: upsert.billing_period,
                status: upsert.status,
                created_at: now,
                updated_at: now,
            };
            doc.subscriptions.push(sub.clone());
            Ok(sub)
        })
        .await
    }

    /// Current entitlement for an account (newest subscription row wins)
    pub async fn is_entitled(&self, account_id: u64) -> Result<bool, StoreError> {
        let subs = self.subscriptions_for_account(account_id).await?;
        Ok(entitlement::is_entitled(&subs))
    }

    // ========== Alerts ==========

    pub async fn create_alert(
        &self,
        account_id: u64,
        criteria: serde_json::Value,
    ) -> Result<Alert, StoreError> {
        self.mutate(|doc| {
            let alert = Alert {
                id: doc.next_alert_id(),
                account_id,
                criteria,
                notifications_sent: 0,
                created_at: Utc::now(),
            };
            doc.alerts.push(alert.clone());
            Ok(alert)
        })
        .await
    }

    pub async fn alerts_for_account(&self, account_id: u64) -> Result<Vec<Alert>, StoreError> {
        Ok(self.load().await?.alerts_for_account(account_id))
    }

    /// Delete an alert; both id and owner must match. Returns the
    /// deleted alert, or None when absent or foreign-owned.
    pub async fn delete_alert(
        &self,
        alert_id: u64,
        account_id: u64,
    ) -> Result<Option<Alert>, StoreError> {
        self.mutate_opt(|doc| {
            let Some(idx) = doc
                .alerts
                .iter()
                .position(|a| a.id == alert_id && a.account_id == account_id)
            else {
                return Ok(None);
            };
            Ok(Some(doc.alerts.remove(idx)))
        })
        .await
    }

    /// Alerts eligible for the notification sweep, joined with their
    /// owner's email. Alerts whose owner is missing are skipped.
    pub async fn pending_alerts(&self, ceiling: u32) -> Result<Vec<PendingAlert>, StoreError> {
        let doc = self.load().await?;
        Ok(doc
            .alerts
            .iter()
            .filter(|a| a.notifications_sent < ceiling)
            .filter_map(|a| {
                doc.account_by_id(a.account_id).map(|owner| PendingAlert {
                    alert: a.clone(),
                    email: owner.email.clone(),
                })
            })
            .collect())
    }

    /// Bump the attempt counter; no-op when the alert no longer exists
    pub async fn increment_notifications_sent(
        &self,
        alert_id: u64,
    ) -> Result<Option<Alert>, StoreError> {
        self.mutate_opt(|doc| {
            let Some(alert) = doc.alerts.iter_mut().find(|a| a.id == alert_id) else {
                return Ok(None);
            };
            alert.notifications_sent += 1;
            Ok(Some(alert.clone()))
        })
        .await
    }

    // ========== Deal records ==========

    pub async fn create_deal(&self, new: NewDealRecord) -> Result<DealRecord, StoreError> {
        self.mutate(move |doc| {
            let now = Utc::now();
            let deal = DealRecord {
                id: doc.next_deal_id(),
                account_id: new.account_id,
                title: new.title,
                location: new.location,
                input: new.input,
                metrics: new.metrics,
                tags: new.tags,
                note: new.note,
                created_at: now,
                updated_at: now,
            };
            doc.deals.push(deal.clone());
            Ok(deal)
        })
        .await
    }

    pub async fn deals_for_account(&self, account_id: u64) -> Result<Vec<DealRecord>, StoreError> {
        Ok(self.load().await?.deals_for_account(account_id))
    }

    /// Update the mutable fields (tags, note) of an owned deal record.
    /// Returns None when absent or foreign-owned. `None` arguments
    /// leave the corresponding field untouched.
    pub async fn update_deal(
        &self,
        account_id: u64,
        deal_id: u64,
        tags: Option<Vec<String>>,
        note: Option<String>,
    ) -> Result<Option<DealRecord>, StoreError> {
        self.mutate_opt(|doc| {
            let Some(deal) = doc
                .deals
                .iter_mut()
                .find(|d| d.id == deal_id && d.account_id == account_id)
            else {
                return Ok(None);
            };
            if let Some(tags) = tags {
                deal.tags = tags;
            }
            if let Some(note) = note {
                deal.note = note;
            }
            deal.updated_at = Utc::now();
            Ok(Some(deal.clone()))
        })
        .await
    }
}

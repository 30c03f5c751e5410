//! Alert notification sweep
//!
//! On each tick, loads every alert still under the notification
//! ceiling and rolls a match per alert (placeholder for real
//! listing-match logic). Matched alerts get one notification through
//! the fallback chain; the attempt counter is bumped whether or not a
//! transport confirmed delivery. Per-alert failures are logged and
//! never abort the sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, error, info};

use crate::config::SweepConfig;
use crate::error::ServerResult;
use crate::notify::{AlertMessage, NotifierChain};
use crate::store::JsonStore;

pub struct AlertSweeper {
    store: Arc<JsonStore>,
    notifiers: Arc<NotifierChain>,
    config: SweepConfig,
}

impl AlertSweeper {
    pub fn new(store: Arc<JsonStore>, notifiers: Arc<NotifierChain>, config: SweepConfig) -> Self {
        Self {
            store,
            notifiers,
            config,
        }
    }

    /// Run until the shutdown signal arrives
    pub async fn run(&self, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        let mut ticker = interval(Duration::from_secs(self.config.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        error!(error = %e, "alert sweep failed");
                    }
                }
                _ = shutdown.recv() => {
                    info!("alert sweeper shutting down");
                    break;
                }
            }
        }
    }

    /// One full pass over the pending alerts
    pub async fn sweep_once(&self) -> ServerResult<usize> {
        let pending = self
            .store
            .pending_alerts(self.config.max_notifications)
            .await?;
        debug!(pending = pending.len(), "alert sweep tick");

        let mut notified = 0;
        for entry in pending {
            if rand::random::<f64>() >= self.config.match_chance {
                continue;
            }
            if let Err(e) = self.notify(&entry).await {
                error!(alert_id = entry.alert.id, error = %e, "alert notification failed");
            } else {
                notified += 1;
            }
        }
        Ok(notified)
    }

    async fn notify(&self, entry: &crate::store::PendingAlert) -> ServerResult<()> {
        let message = AlertMessage::listing_match(&entry.email, &entry.alert.criteria);
        let delivery = self.notifiers.dispatch(&message).await;
        // attempts count even when every transport failed
        self.store
            .increment_notifications_sent(entry.alert.id)
            .await?;
        delivery
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Notifier;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct CountingNotifier {
        fail: bool,
        sent: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn send(&self, _message: &AlertMessage) -> ServerResult<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(crate::error::ServerError::Internal("down".into()))
            } else {
                Ok(())
            }
        }
    }

    async fn setup(
        match_chance: f64,
        fail: bool,
    ) -> (tempfile::TempDir, Arc<JsonStore>, AlertSweeper, Arc<AtomicUsize>) {
        let dir = tempdir().unwrap();
        let store = Arc::new(JsonStore::open(dir.path().join("data.json")).await.unwrap());
        let sent = Arc::new(AtomicUsize::new(0));
        let chain = Arc::new(NotifierChain::new(vec![Box::new(CountingNotifier {
            fail,
            sent: Arc::clone(&sent),
        })]));
        let config = SweepConfig {
            match_chance,
            max_notifications: 3,
            ..SweepConfig::default()
        };
        let sweeper = AlertSweeper::new(Arc::clone(&store), chain, config);
        (dir, store, sweeper, sent)
    }

    #[tokio::test]
    async fn test_sweep_notifies_matching_alerts() {
        // match_chance 1.0 makes every alert match
        let (_dir, store, sweeper, sent) = setup(1.0, false).await;
        let account = store.create_account("a@x.com", "h").await.unwrap();
        store.create_alert(account.id, json!("criteria")).await.unwrap();

        let notified = sweeper.sweep_once().await.unwrap();
        assert_eq!(notified, 1);
        assert_eq!(sent.load(Ordering::SeqCst), 1);

        let alerts = store.alerts_for_account(account.id).await.unwrap();
        assert_eq!(alerts[0].notifications_sent, 1);
    }

    #[tokio::test]
    async fn test_sweep_skips_when_no_match() {
        let (_dir, store, sweeper, sent) = setup(0.0, false).await;
        let account = store.create_account("a@x.com", "h").await.unwrap();
        store.create_alert(account.id, json!("criteria")).await.unwrap();

        let notified = sweeper.sweep_once().await.unwrap();
        assert_eq!(notified, 0);
        assert_eq!(sent.load(Ordering::SeqCst), 0);

        let alerts = store.alerts_for_account(account.id).await.unwrap();
        assert_eq!(alerts[0].notifications_sent, 0);
    }

    #[tokio::test]
    async fn test_attempt_counted_even_when_delivery_fails() {
        let (_dir, store, sweeper, sent) = setup(1.0, true).await;
        let account = store.create_account("a@x.com", "h").await.unwrap();
        store.create_alert(account.id, json!("criteria")).await.unwrap();

        let notified = sweeper.sweep_once().await.unwrap();
        assert_eq!(notified, 0);
        assert_eq!(sent.load(Ordering::SeqCst), 1);

        let alerts = store.alerts_for_account(account.id).await.unwrap();
        assert_eq!(alerts[0].notifications_sent, 1);
    }

    #[tokio::test]
    async fn test_alerts_at_ceiling_are_skipped() {
        let (_dir, store, sweeper, sent) = setup(1.0, false).await;
        let account = store.create_account("a@x.com", "h").await.unwrap();
        let alert = store.create_alert(account.id, json!("criteria")).await.unwrap();
        for _ in 0..3 {
            store.increment_notifications_sent(alert.id).await.unwrap();
        }

        let notified = sweeper.sweep_once().await.unwrap();
        assert_eq!(notified, 0);
        assert_eq!(sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sweep_covers_all_accounts() {
        let (_dir, store, sweeper, sent) = setup(1.0, false).await;
        for email in ["a@x.com", "b@x.com", "c@x.com"] {
            let account = store.create_account(email, "h").await.unwrap();
            store.create_alert(account.id, json!("criteria")).await.unwrap();
        }

        let notified = sweeper.sweep_once().await.unwrap();
        assert_eq!(notified, 3);
        assert_eq!(sent.load(Ordering::SeqCst), 3);
    }
}

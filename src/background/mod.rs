//! Background jobs
//!
//! The alert sweep runs continuously, discovering pending work by
//! querying the store on each tick. It never blocks the HTTP request
//! path; notification delivery is fully asynchronous.

pub mod alert_sweep;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::config::SweepConfig;
use crate::error::ServerResult;
use crate::notify::NotifierChain;
use crate::store::JsonStore;

pub use alert_sweep::AlertSweeper;

/// Background job runner
///
/// Owns the shutdown channel and the spawned job tasks.
pub struct BackgroundJobRunner {
    store: Arc<JsonStore>,
    notifiers: Arc<NotifierChain>,
    config: SweepConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl BackgroundJobRunner {
    pub fn new(store: Arc<JsonStore>, notifiers: Arc<NotifierChain>, config: SweepConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            store,
            notifiers,
            config,
            shutdown_tx,
        }
    }

    /// Start all background jobs
    pub fn start(&self) -> ServerResult<Vec<tokio::task::JoinHandle<()>>> {
        if self.config.disabled {
            info!("background jobs disabled via PROPFOLIO_SWEEP_DISABLED");
            return Ok(vec![]);
        }

        let mut handles = Vec::new();

        let sweeper = AlertSweeper::new(
            Arc::clone(&self.store),
            Arc::clone(&self.notifiers),
            self.config.clone(),
        );
        let shutdown_rx = self.shutdown_tx.subscribe();
        handles.push(tokio::spawn(async move {
            sweeper.run(shutdown_rx).await;
        }));
        info!(
            interval_secs = self.config.interval_secs,
            match_chance = self.config.match_chance,
            "alert sweep job started"
        );

        Ok(handles)
    }

    /// Signal all jobs to stop
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

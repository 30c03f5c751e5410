//! Application state shared across HTTP handlers

use std::sync::Arc;

use crate::auth::TokenSigner;
use crate::billing::{BillingProvider, Reconciler};
use crate::config::Config;
use crate::store::JsonStore;

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<JsonStore>,

    /// Signs and verifies bearer tokens
    pub tokens: TokenSigner,

    /// Billing provider gateway (stubbed in tests)
    pub billing: Arc<dyn BillingProvider>,

    /// Folds webhook events into the subscription mirror
    pub reconciler: Reconciler,

    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<JsonStore>, billing: Arc<dyn BillingProvider>, config: Config) -> Self {
        Self {
            tokens: TokenSigner::new(&config.token_secret),
            reconciler: Reconciler::new(Arc::clone(&store)),
            store,
            billing,
            config,
        }
    }
}

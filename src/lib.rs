//! propfolio-server library exports (for testing)

pub mod api;
pub mod auth;
pub mod background;
pub mod billing;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod notify;
pub mod store;

// Re-exports
pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{ServerError, ServerResult};
pub use store::JsonStore;

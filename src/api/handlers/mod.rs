//! HTTP request handlers

pub mod alerts;
pub mod analysis;
pub mod auth;
pub mod checkout;
pub mod deals;
pub mod health;
pub mod webhook;

pub use alerts::{create_alert, delete_alert, list_alerts};
pub use analysis::advanced_analysis;
pub use auth::{login, me, signup};
pub use checkout::{create_checkout_session, get_session};
pub use deals::{create_deal, list_deals, update_deal};
pub use health::health_check;
pub use webhook::receive_webhook;

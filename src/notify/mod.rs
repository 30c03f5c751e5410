//! Alert notification delivery
//!
//! A chain of transports tried in order until one accepts the message:
//! transactional email API, then SMTP relay, then the log sink. The
//! log sink never fails, so a fully unconfigured server still "delivers"
//! by printing the message, which is the development default.

mod email_api;
mod smtp;

pub use email_api::EmailApiNotifier;
pub use smtp::SmtpNotifier;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ServerError, ServerResult};

/// One rendered alert notification
#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    /// Render a listing-match notification for an alert's criteria
    pub fn listing_match(to: &str, criteria: &serde_json::Value) -> Self {
        let criteria = match criteria {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self {
            to: to.to_string(),
            subject: format!("New listing match: {criteria}"),
            body: format!("A new listing matches your saved search criteria: {criteria}"),
        }
    }
}

/// A single notification transport
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, message: &AlertMessage) -> ServerResult<()>;
}

/// Terminal transport: writes the message to the log and always succeeds
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &AlertMessage) -> ServerResult<()> {
        info!(to = %message.to, subject = %message.subject, body = %message.body, "alert notification");
        Ok(())
    }
}

/// Ordered fallback chain over the configured transports
pub struct NotifierChain {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierChain {
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    /// Build the chain from configuration. Disabled transports are
    /// skipped; the log sink is always appended last.
    pub fn from_config(config: &Config) -> ServerResult<Self> {
        let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();
        if config.email_api.is_enabled() {
            notifiers.push(Box::new(EmailApiNotifier::new(&config.email_api)));
        }
        if config.smtp.is_enabled() {
            notifiers.push(Box::new(SmtpNotifier::new(&config.smtp)?));
        }
        notifiers.push(Box::new(LogNotifier));
        Ok(Self::new(notifiers))
    }

    /// Try each transport in order; the first success wins. Failures
    /// are logged and the next transport is tried.
    pub async fn dispatch(&self, message: &AlertMessage) -> ServerResult<()> {
        let mut last_error = ServerError::Internal("no notifiers configured".into());
        for notifier in &self.notifiers {
            match notifier.send(message).await {
                Ok(()) => {
                    info!(transport = notifier.name(), to = %message.to, "notification delivered");
                    return Ok(());
                }
                Err(e) => {
                    warn!(transport = notifier.name(), error = %e, "notification transport failed, trying next");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

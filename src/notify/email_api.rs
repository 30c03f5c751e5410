//! Transactional email API transport

use async_trait::async_trait;
use serde::Serialize;

use super::{AlertMessage, Notifier};
use crate::config::EmailApiConfig;
use crate::error::{ServerError, ServerResult};

/// Sends via an HTTP email API (`POST {url}` with a bearer key)
pub struct EmailApiNotifier {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl EmailApiNotifier {
    pub fn new(config: &EmailApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url.clone().unwrap_or_default(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        }
    }
}

#[async_trait]
impl Notifier for EmailApiNotifier {
    fn name(&self) -> &'static str {
        "email-api"
    }

    async fn send(&self, message: &AlertMessage) -> ServerResult<()> {
        let mut request = self.client.post(&self.url).json(&SendRequest {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServerError::Internal(format!("email api: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServerError::Internal(format!(
                "email api returned {}",
                status
            )));
        }
        Ok(())
    }
}

//! SMTP relay transport

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{AlertMessage, Notifier};
use crate::config::SmtpConfig;
use crate::error::{ServerError, ServerResult};

/// Sends through a configured SMTP relay (STARTTLS)
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> ServerResult<Self> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| ServerError::Config("SMTP host not configured".into()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| ServerError::Config(format!("smtp relay {}: {}", host, e)))?
            .port(config.port);
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, message: &AlertMessage) -> ServerResult<()> {
        let email = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| ServerError::Config(format!("smtp from address: {}", e)))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| ServerError::Internal(format!("recipient address: {}", e)))?)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| ServerError::Internal(format!("build email: {}", e)))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| ServerError::Internal(format!("smtp send: {}", e)))?;
        Ok(())
    }
}

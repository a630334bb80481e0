use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use super::{Alert, NotificationResult, Notifier};
use crate::Result;
use crate::config::SmtpSettings;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub from_email: Option<String>,
    pub password: Option<String>,
    pub to_email: Option<String>,
}

impl EmailConfig {
    /// The sender address doubles as the SMTP login.
    pub fn from_settings(settings: &SmtpSettings, recipient: Option<String>) -> Self {
        EmailConfig {
            smtp_server: settings.smtp_server.clone(),
            smtp_port: settings.smtp_port,
            from_email: settings.email_address.clone(),
            password: settings.email_password.clone(),
            to_email: recipient,
        }
    }
}

/// Sender, password and recipient, present only when all three are set.
struct Envelope<'a> {
    from: &'a str,
    password: &'a str,
    to: &'a str,
}

pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        EmailNotifier { config }
    }

    fn envelope(&self) -> Option<Envelope<'_>> {
        Some(Envelope {
            from: self.config.from_email.as_deref()?,
            password: self.config.password.as_deref()?,
            to: self.config.to_email.as_deref()?,
        })
    }

    fn build_message(&self, alert: &Alert, from: &str, to: &str) -> Result<Message> {
        let message = Message::builder()
            .from(from.parse::<Mailbox>()?)
            .to(to.parse::<Mailbox>()?)
            .subject(alert.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.body.clone())?;

        Ok(message)
    }

    async fn send(&self, alert: &Alert, envelope: &Envelope<'_>) -> Result<Option<String>> {
        let message = self.build_message(alert, envelope.from, envelope.to)?;

        // STARTTLS upgrade, then login with the sender address
        let credentials = Credentials::new(envelope.from.to_string(), envelope.password.to_string());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_server)?
            .port(self.config.smtp_port)
            .credentials(credentials)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        let response = mailer.send(message).await?;
        Ok(response.first_line().map(str::to_string))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn notify(&self, alert: &Alert) -> NotificationResult {
        let Some(envelope) = self.envelope() else {
            tracing::warn!("Email not sent: missing credentials");
            return NotificationResult::failed("missing credentials");
        };

        match self.send(alert, &envelope).await {
            Ok(message_id) => {
                tracing::info!("Email sent to {}: {}", envelope.to, alert.subject);
                NotificationResult::sent(message_id)
            }
            Err(e) => {
                tracing::warn!("Failed to send email: {}", e);
                NotificationResult::failed(e.to_string())
            }
        }
    }
}

//! Email Transport
//!
//! Implementations of the outbound message port.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::{PaymentError, Result};

/// Default HTTP email API endpoint
pub const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";

/// A rendered message ready for delivery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Outbound email transport
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message (single attempt)
    async fn send(&self, email: &OutboundEmail) -> Result<()>;

    /// Transport name for logs
    fn name(&self) -> &'static str;
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// JSON-over-HTTP email API client
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: SecretString,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: impl Into<String>, api_key: SecretString, from: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PaymentError::Config(format!("email client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
            from: from.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let body = SendEmailRequest {
            from: &self.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::Notification(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(PaymentError::Notification(format!("email API returned {status}: {detail}")))
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Logs messages instead of sending them (no transport configured)
///
/// Only the recipient and subject are logged; bodies may hold credentials.
#[derive(Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        tracing::info!(to = %email.to, subject = %email.subject, "Email transport disabled; message not sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Keeps every message in memory (for tests)
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        self.sent.lock().await.push(email.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

//! Confirmation Notifications
//!
//! Best-effort receipt sent after provisioning. Delivery failures are
//! logged and reported as a status; they never fail event processing.

use std::sync::Arc;

use askama::Template;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{PaymentError, Result};
use crate::mailer::{Mailer, OutboundEmail};
use crate::provision::{ProvisioningOutcome, Receipt};

/// Fields handed to the message template
#[derive(Debug)]
pub struct ConfirmationMessage {
    pub to: String,
    pub display_name: Option<String>,
    pub plan_name: String,
    pub amount: String,
    pub currency: String,
    pub invoice_id: Option<String>,
    pub invoice_url: Option<String>,
    pub is_new_user: bool,
    /// Only for new accounts
    pub credential: Option<SecretString>,
    pub login_url: String,
}

impl ConfirmationMessage {
    pub fn new(outcome: &ProvisioningOutcome, receipt: &Receipt, login_url: &str) -> Self {
        Self {
            to: outcome.account.email.to_string(),
            display_name: outcome.account.display_name.clone(),
            plan_name: receipt.plan_name.clone(),
            amount: receipt.formatted_amount(),
            currency: receipt.currency.clone(),
            invoice_id: receipt.invoice_id.clone(),
            invoice_url: receipt.invoice_url.clone(),
            is_new_user: outcome.is_new_user,
            credential: if outcome.is_new_user {
                outcome
                    .credential
                    .as_ref()
                    .map(|c| SecretString::from(c.expose().to_string()))
            } else {
                None
            },
            login_url: login_url.to_string(),
        }
    }

    pub fn subject(&self) -> String {
        if self.is_new_user {
            format!("Welcome! Your {} subscription is ready", self.plan_name)
        } else {
            format!("Receipt for your {} subscription", self.plan_name)
        }
    }

    /// Render the HTML and text bodies
    pub fn render(&self) -> Result<OutboundEmail> {
        let credential = self.credential.as_ref().map(|c| c.expose_secret());

        let html = ConfirmationHtml {
            email: &self.to,
            display_name: self.display_name.as_deref(),
            plan_name: &self.plan_name,
            amount: &self.amount,
            currency: &self.currency,
            invoice_id: self.invoice_id.as_deref(),
            invoice_url: self.invoice_url.as_deref(),
            credential,
            login_url: &self.login_url,
        }
        .render()
        .map_err(|e| PaymentError::Notification(e.to_string()))?;

        let text = ConfirmationText {
            email: &self.to,
            display_name: self.display_name.as_deref(),
            plan_name: &self.plan_name,
            amount: &self.amount,
            currency: &self.currency,
            invoice_id: self.invoice_id.as_deref(),
            invoice_url: self.invoice_url.as_deref(),
            credential,
            login_url: &self.login_url,
        }
        .render()
        .map_err(|e| PaymentError::Notification(e.to_string()))?;

        Ok(OutboundEmail {
            to: self.to.clone(),
            subject: self.subject(),
            html,
            text,
        })
    }
}

#[derive(Template)]
#[template(path = "confirmation.html")]
struct ConfirmationHtml<'a> {
    email: &'a str,
    display_name: Option<&'a str>,
    plan_name: &'a str,
    amount: &'a str,
    currency: &'a str,
    invoice_id: Option<&'a str>,
    invoice_url: Option<&'a str>,
    credential: Option<&'a str>,
    login_url: &'a str,
}

#[derive(Template)]
#[template(path = "confirmation.txt")]
struct ConfirmationText<'a> {
    email: &'a str,
    display_name: Option<&'a str>,
    plan_name: &'a str,
    amount: &'a str,
    currency: &'a str,
    invoice_id: Option<&'a str>,
    invoice_url: Option<&'a str>,
    credential: Option<&'a str>,
    login_url: &'a str,
}

/// What happened to the confirmation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationStatus {
    Sent,
    Failed(String),
}

/// Sends confirmation messages through a [`Mailer`]
pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    login_url: String,
}

impl NotificationDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, login_url: impl Into<String>) -> Self {
        Self {
            mailer,
            login_url: login_url.into(),
        }
    }

    /// Attempt delivery once; never returns an error
    pub async fn notify(&self, outcome: &ProvisioningOutcome, receipt: &Receipt) -> NotificationStatus {
        let message = ConfirmationMessage::new(outcome, receipt, &self.login_url);

        let result = match message.render() {
            Ok(email) => self.mailer.send(&email).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::info!(
                    account_id = %outcome.account.id,
                    is_new_user = outcome.is_new_user,
                    mailer = self.mailer.name(),
                    "Confirmation sent"
                );
                NotificationStatus::Sent
            }
            Err(e) => {
                tracing::warn!(
                    account_id = %outcome.account.id,
                    error = %e,
                    "Confirmation not delivered (non-fatal)"
                );
                NotificationStatus::Failed(e.to_string())
            }
        }
    }
}

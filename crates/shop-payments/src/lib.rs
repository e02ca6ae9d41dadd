//! # shop-payments
//!
//! Payment event processing for the storefront: a webhook delivery becomes
//! at most one account per customer email plus a best-effort receipt.
//!
//! ```text
//! raw body + Stripe-Signature
//!          │
//!          ▼
//! ┌──────────────────┐  reject (400)
//! │ WebhookVerifier  │──────────────▶
//! └────────┬─────────┘
//!          │ PaymentEvent
//!          ▼
//! ┌──────────────────┐  lifecycle / unknown types: log + acknowledge
//! │ EventDispatcher  │──────────────▶
//! └────────┬─────────┘
//!          │ checkout.session.completed (subscription mode)
//!          ▼
//! ┌──────────────────┐     ┌──────────────────────┐
//! │AccountProvisioner│────▶│NotificationDispatcher│ (failures logged only)
//! └────────┬─────────┘     └──────────────────────┘
//!          ▼
//!    AccountStore (memory | postgres)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shop_payments::*;
//!
//! let verifier = WebhookVerifier::new(Some(secret));
//! let dispatcher = EventDispatcher::new(
//!     AccountProvisioner::new(Arc::new(MemoryAccountStore::new())),
//!     NotificationDispatcher::new(Arc::new(LogMailer), "https://shop.example/login"),
//! );
//!
//! let event = verifier.verify(&body, signature_header)?;
//! let outcome = dispatcher.dispatch(&event).await;
//! ```

mod account;
mod checkout;
mod credential;
mod dispatch;
mod error;
mod event;
mod mailer;
mod notify;
mod plan;
mod provision;
mod verify;

#[cfg(feature = "postgres")]
mod postgres;

pub use account::{
    ACCOUNT_SCHEMA_VERSION, AccountId, AccountStore, EmailAddress, MemoryAccountStore, NewAccount,
    SubscriptionFields, UserAccount,
};
pub use checkout::{CheckoutLineItem, CheckoutRequest, HostedCheckout, StripeClient};
pub use credential::{CREDENTIAL_LENGTH, Credential};
pub use dispatch::{DispatchOutcome, EventDispatcher};
pub use error::{PaymentError, Result};
pub use event::{EventKind, PaymentEvent, Verification};
pub use mailer::{DEFAULT_EMAIL_API_URL, HttpMailer, LogMailer, Mailer, OutboundEmail, RecordingMailer};
pub use notify::{NotificationDispatcher, NotificationStatus};
pub use plan::{BillingCycle, DEFAULT_PLAN_NAME, Plan, PlanListing, PlanPricing};
pub use provision::{AccountProvisioner, CheckoutDetails, ProvisioningOutcome, Receipt};
pub use verify::{DEFAULT_TOLERANCE_SECS, SIGNATURE_HEADER, WebhookVerifier, compute_signature};

#[cfg(feature = "postgres")]
pub use postgres::PgAccountStore;

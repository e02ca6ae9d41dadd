//! Payment Events
//!
//! Typed view of the webhook envelope `{ id?, type, data: { object } }`.
//! Dispatch matches on [`EventKind`] exhaustively, so a new event type has
//! to be routed explicitly.
//!
//! Only the envelope has to parse. An object that does not fit its typed
//! view still yields an event, so a verified delivery is never rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How an event's authenticity was established
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    /// Signature checked against the shared secret
    Verified,
    /// Bypass mode: no secret configured, body parsed as-is
    Unverified,
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified)
    }
}

/// A trusted (or explicitly unverified) payment event
#[derive(Clone, Debug)]
pub struct PaymentEvent {
    /// Source event id; absent for hand-built test bodies
    pub id: Option<String>,

    /// Raw type string as delivered
    pub event_type: String,

    pub verification: Verification,

    pub kind: EventKind,
}

/// Event payload, by type
#[derive(Clone, Debug)]
pub enum EventKind {
    CheckoutCompleted(Box<CheckoutSession>),
    /// `checkout.session.completed` whose object could not be read
    CheckoutUnreadable(String),
    SubscriptionCreated(SubscriptionSummary),
    SubscriptionUpdated(SubscriptionSummary),
    SubscriptionDeleted(SubscriptionSummary),
    TrialWillEnd(SubscriptionSummary),
    EntitlementUpdated(EntitlementSummary),
    Unrecognized(String),
}

impl EventKind {
    /// Short label for logs
    pub fn label(&self) -> &str {
        match self {
            EventKind::CheckoutCompleted(_) => "checkout-completed",
            EventKind::CheckoutUnreadable(_) => "checkout-unreadable",
            EventKind::SubscriptionCreated(_) => "subscription-created",
            EventKind::SubscriptionUpdated(_) => "subscription-updated",
            EventKind::SubscriptionDeleted(_) => "subscription-deleted",
            EventKind::TrialWillEnd(_) => "subscription-trial-ending",
            EventKind::EntitlementUpdated(_) => "entitlement-updated",
            EventKind::Unrecognized(t) => t.as_str(),
        }
    }
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

impl PaymentEvent {
    /// Parse a raw webhook body
    ///
    /// Fails only when the envelope itself is malformed.
    pub fn parse(payload: &[u8], verification: Verification) -> Result<Self> {
        let raw: RawEvent = serde_json::from_slice(payload)?;
        let kind = EventKind::from_parts(&raw.event_type, raw.data.object);

        Ok(Self {
            id: raw.id,
            event_type: raw.event_type,
            verification,
            kind,
        })
    }
}

impl EventKind {
    fn from_parts(event_type: &str, object: serde_json::Value) -> Self {
        match event_type {
            "checkout.session.completed" => match serde_json::from_value(object) {
                Ok(session) => EventKind::CheckoutCompleted(Box::new(session)),
                Err(e) => EventKind::CheckoutUnreadable(format!("invalid {event_type} object: {e}")),
            },
            "customer.subscription.created" => {
                EventKind::SubscriptionCreated(summary_or_default(event_type, object))
            }
            "customer.subscription.updated" => {
                EventKind::SubscriptionUpdated(summary_or_default(event_type, object))
            }
            "customer.subscription.deleted" => {
                EventKind::SubscriptionDeleted(summary_or_default(event_type, object))
            }
            "customer.subscription.trial_will_end" => {
                EventKind::TrialWillEnd(summary_or_default(event_type, object))
            }
            "entitlements.active_entitlement_summary.updated" => {
                EventKind::EntitlementUpdated(summary_or_default(event_type, object))
            }
            other => EventKind::Unrecognized(other.to_string()),
        }
    }
}

/// Log-only summaries degrade to empty rather than failing the event
fn summary_or_default<T: DeserializeOwned + Default>(event_type: &str, object: serde_json::Value) -> T {
    serde_json::from_value(object).unwrap_or_else(|e| {
        tracing::warn!(event_type = %event_type, error = %e, "Event object did not match summary shape");
        T::default()
    })
}

/// A reference that arrives either as a bare id or an expanded object
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Expandable {
    Id(String),
    Object(ExpandedObject),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ExpandedObject {
    pub id: String,
    #[serde(default)]
    pub hosted_invoice_url: Option<String>,
}

impl Expandable {
    pub fn id(&self) -> &str {
        match self {
            Expandable::Id(id) => id,
            Expandable::Object(obj) => &obj.id,
        }
    }

    /// Hosted invoice page, only known when the invoice was expanded
    pub fn hosted_invoice_url(&self) -> Option<&str> {
        match self {
            Expandable::Id(_) => None,
            Expandable::Object(obj) => obj.hosted_invoice_url.as_deref(),
        }
    }
}

/// Checkout mode
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    Payment,
    Subscription,
    Setup,
    #[serde(other)]
    Unknown,
}

/// `checkout.session.completed` object (fields this service reads)
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CheckoutSession {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub mode: Option<CheckoutMode>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub subscription: Option<Expandable>,
    #[serde(default)]
    pub customer: Option<Expandable>,
    #[serde(default)]
    pub invoice: Option<Expandable>,
    #[serde(default)]
    pub metadata: Option<CheckoutMetadata>,
    /// Amount in minor units
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub line_items: Option<LineItemList>,
}

impl CheckoutSession {
    pub fn is_subscription(&self) -> bool {
        self.mode == Some(CheckoutMode::Subscription)
    }

    /// Customer email as delivered, preferring the details block
    pub fn raw_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .filter(|e| !e.trim().is_empty())
            .or(self.customer_email.as_deref())
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_details.as_ref().and_then(|d| d.name.as_deref())
    }

    pub fn plan_slug(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.plan_slug.as_deref())
    }

    pub fn billing_cycle(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.billing_cycle.as_deref())
    }

    /// Product name carried by the payload, if any
    pub fn product_name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.plan_name.as_deref())
            .or_else(|| {
                self.line_items
                    .as_ref()
                    .and_then(|l| l.data.first())
                    .and_then(|item| item.description.as_deref())
            })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CheckoutMetadata {
    #[serde(default)]
    pub plan_slug: Option<String>,
    #[serde(default)]
    pub billing_cycle: Option<String>,
    #[serde(default)]
    pub plan_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LineItemList {
    #[serde(default)]
    pub data: Vec<LineItem>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub description: Option<String>,
}

/// Subscription lifecycle object (fields kept for logging)
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubscriptionSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub customer: Option<Expandable>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Entitlement summary object
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EntitlementSummary {
    #[serde(default)]
    pub customer: Option<String>,
}

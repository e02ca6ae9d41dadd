//! Event Dispatch
//!
//! Routes a trusted [`PaymentEvent`] to its handler. Dispatch never fails:
//! every outcome, including provisioning errors, is acknowledged so the
//! payment processor does not retry a delivery that cannot succeed.

use crate::account::AccountId;
use crate::error::PaymentError;
use crate::event::{CheckoutSession, EventKind, PaymentEvent};
use crate::notify::{NotificationDispatcher, NotificationStatus};
use crate::provision::{AccountProvisioner, CheckoutDetails};

/// What dispatch did with an event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Account created or updated, confirmation attempted
    Provisioned {
        account_id: AccountId,
        is_new_user: bool,
        notification: NotificationStatus,
    },
    /// Checkout completed in payment or setup mode
    NotSubscription,
    /// Checkout carried no usable email
    MissingIdentity,
    /// Provisioning failed; logged and acknowledged
    ProvisioningFailed(String),
    /// Known lifecycle event, logged only
    Acknowledged(&'static str),
    /// Unknown event type
    Ignored(String),
}

/// Event router
pub struct EventDispatcher {
    provisioner: AccountProvisioner,
    notifier: NotificationDispatcher,
}

impl EventDispatcher {
    pub fn new(provisioner: AccountProvisioner, notifier: NotificationDispatcher) -> Self {
        Self {
            provisioner,
            notifier,
        }
    }

    /// Handle one event
    pub async fn dispatch(&self, event: &PaymentEvent) -> DispatchOutcome {
        tracing::info!(
            event_id = ?event.id,
            event_type = %event.event_type,
            verified = event.verification.is_verified(),
            "Processing payment event"
        );

        match &event.kind {
            EventKind::CheckoutCompleted(session) => self.checkout_completed(session).await,
            EventKind::CheckoutUnreadable(reason) => {
                tracing::error!(event_id = ?event.id, reason = %reason, "Unreadable checkout object");
                DispatchOutcome::ProvisioningFailed(reason.clone())
            }
            EventKind::SubscriptionCreated(sub) => {
                tracing::info!(subscription_id = ?sub.id, status = ?sub.status, "Subscription created");
                DispatchOutcome::Acknowledged("subscription-created")
            }
            EventKind::SubscriptionUpdated(sub) => {
                tracing::info!(subscription_id = ?sub.id, status = ?sub.status, "Subscription updated");
                DispatchOutcome::Acknowledged("subscription-updated")
            }
            EventKind::SubscriptionDeleted(sub) => {
                tracing::info!(subscription_id = ?sub.id, "Subscription cancelled");
                DispatchOutcome::Acknowledged("subscription-deleted")
            }
            EventKind::TrialWillEnd(sub) => {
                tracing::info!(subscription_id = ?sub.id, "Subscription trial ending soon");
                DispatchOutcome::Acknowledged("subscription-trial-ending")
            }
            EventKind::EntitlementUpdated(summary) => {
                tracing::info!(customer = ?summary.customer, "Entitlement summary updated");
                DispatchOutcome::Acknowledged("entitlement-updated")
            }
            EventKind::Unrecognized(event_type) => {
                tracing::info!(event_type = %event_type, "Unhandled event type");
                DispatchOutcome::Ignored(event_type.clone())
            }
        }
    }

    async fn checkout_completed(&self, session: &CheckoutSession) -> DispatchOutcome {
        if !session.is_subscription() {
            tracing::info!(
                session_id = ?session.id,
                mode = ?session.mode,
                "Checkout is not a subscription, nothing to provision"
            );
            return DispatchOutcome::NotSubscription;
        }

        let details = match CheckoutDetails::from_session(session) {
            Ok(details) => details,
            Err(PaymentError::MissingIdentity) => {
                tracing::error!(session_id = ?session.id, "Checkout completed without customer email");
                return DispatchOutcome::MissingIdentity;
            }
            Err(e) => {
                tracing::error!(session_id = ?session.id, error = %e, "Invalid checkout details");
                return DispatchOutcome::ProvisioningFailed(e.to_string());
            }
        };

        let outcome = match self.provisioner.provision(&details).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    session_id = ?session.id,
                    email = %details.email,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Account provisioning failed"
                );
                return DispatchOutcome::ProvisioningFailed(e.to_string());
            }
        };

        let notification = self.notifier.notify(&outcome, &details.receipt).await;

        DispatchOutcome::Provisioned {
            account_id: outcome.account.id,
            is_new_user: outcome.is_new_user,
            notification,
        }
    }
}

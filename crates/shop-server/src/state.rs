//! Application State

use std::sync::Arc;

use shop_payments::{EventDispatcher, StripeClient, WebhookVerifier};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Authenticates webhook deliveries
    pub verifier: Arc<WebhookVerifier>,

    /// Routes verified events to provisioning and notification
    pub dispatcher: Arc<EventDispatcher>,

    /// Stripe client (optional - None if not configured)
    pub stripe: Option<Arc<StripeClient>>,
}

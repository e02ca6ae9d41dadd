//! Stripe Checkout Integration
//!
//! Creates hosted checkout sessions. The customer is redirected to Stripe's
//! page; the outcome comes back asynchronously as a
//! `checkout.session.completed` webhook.
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌─────────────┐
//! │  Storefront │────▶│  Stripe Hosted  │────▶│  Storefront │
//! │ (pricing /  │     │  Checkout Page  │     │  (success)  │
//! │    cart)    │     └────────┬────────┘     └─────────────┘
//! └─────────────┘              │ webhook
//!                              ▼
//!                      /api/webhooks/stripe
//! ```

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData,
    CreateCheckoutSessionLineItemsPriceDataRecurring,
    CreateCheckoutSessionLineItemsPriceDataRecurringInterval, Currency,
};

use crate::error::{PaymentError, Result};
use crate::plan::{BillingCycle, Plan};

/// One priced line of a cart checkout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub unit_amount_cents: i64,
    pub quantity: u64,
}

/// What the customer is buying
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutRequest {
    /// Recurring plan; provisions an account once paid
    Subscription {
        plan: Plan,
        cycle: BillingCycle,
        email: Option<String>,
    },
    /// One-off payment for cart contents
    Cart {
        items: Vec<CheckoutLineItem>,
        email: Option<String>,
    },
}

impl CheckoutRequest {
    fn email(&self) -> Option<&str> {
        match self {
            CheckoutRequest::Subscription { email, .. } | CheckoutRequest::Cart { email, .. } => {
                email.as_deref().map(str::trim).filter(|e| !e.is_empty())
            }
        }
    }

    fn mode(&self) -> CheckoutSessionMode {
        match self {
            CheckoutRequest::Subscription { .. } => CheckoutSessionMode::Subscription,
            CheckoutRequest::Cart { .. } => CheckoutSessionMode::Payment,
        }
    }

    /// Read back by the webhook to name the plan
    fn metadata(&self) -> HashMap<String, String> {
        let mut metadata = HashMap::new();
        if let CheckoutRequest::Subscription { plan, cycle, .. } = self {
            metadata.insert("plan_slug".to_string(), plan.slug().to_string());
            metadata.insert("billing_cycle".to_string(), cycle.as_str().to_string());
            metadata.insert("plan_name".to_string(), plan.display_name().to_string());
        }
        metadata
    }

    fn line_items(&self) -> Result<Vec<CreateCheckoutSessionLineItems>> {
        match self {
            CheckoutRequest::Subscription { plan, cycle, .. } => {
                let pricing = plan.pricing(*cycle);
                Ok(vec![CreateCheckoutSessionLineItems {
                    quantity: Some(1),
                    price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                        currency: Currency::USD,
                        unit_amount: Some(pricing.cents),
                        product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                            name: pricing.name,
                            description: Some(pricing.description),
                            ..Default::default()
                        }),
                        recurring: Some(CreateCheckoutSessionLineItemsPriceDataRecurring {
                            interval: match cycle {
                                BillingCycle::Monthly => {
                                    CreateCheckoutSessionLineItemsPriceDataRecurringInterval::Month
                                }
                                BillingCycle::Yearly => {
                                    CreateCheckoutSessionLineItemsPriceDataRecurringInterval::Year
                                }
                            },
                            interval_count: Some(1),
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                }])
            }
            CheckoutRequest::Cart { items, .. } => {
                if items.is_empty() {
                    return Err(PaymentError::Stripe("cart is empty".into()));
                }

                items
                    .iter()
                    .map(|item| {
                        if item.quantity == 0 || item.unit_amount_cents < 0 {
                            return Err(PaymentError::Stripe(format!(
                                "invalid line item: {}",
                                item.name
                            )));
                        }
                        Ok(CreateCheckoutSessionLineItems {
                            quantity: Some(item.quantity),
                            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                                currency: Currency::USD,
                                unit_amount: Some(item.unit_amount_cents),
                                product_data: Some(
                                    CreateCheckoutSessionLineItemsPriceDataProductData {
                                        name: item.name.clone(),
                                        description: item.description.clone(),
                                        ..Default::default()
                                    },
                                ),
                                ..Default::default()
                            }),
                            ..Default::default()
                        })
                    })
                    .collect()
            }
        }
    }
}

/// A created hosted session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedCheckout {
    pub session_id: String,
    /// URL to redirect the customer to
    pub checkout_url: String,
}

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
    public_base_url: String,
}

impl StripeClient {
    pub fn new(secret_key: &SecretString, public_base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(secret_key.expose_secret()),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn success_url(&self) -> String {
        format!(
            "{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.public_base_url
        )
    }

    fn cancel_url(&self, request: &CheckoutRequest) -> String {
        match request {
            CheckoutRequest::Subscription { .. } => format!("{}/pricing", self.public_base_url),
            CheckoutRequest::Cart { .. } => format!("{}/cart", self.public_base_url),
        }
    }

    /// Create a Stripe Checkout session
    pub async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<HostedCheckout> {
        let success_url = self.success_url();
        let cancel_url = self.cancel_url(request);

        let mut params = CreateCheckoutSession::new();
        params.customer_email = request.email();
        params.success_url = Some(&success_url);
        params.cancel_url = Some(&cancel_url);
        params.mode = Some(request.mode());
        params.metadata = Some(request.metadata());
        params.line_items = Some(request.line_items()?);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let checkout_url = session
            .url
            .ok_or_else(|| PaymentError::Stripe("No checkout URL returned".into()))?;

        tracing::info!(session_id = %session.id, mode = ?request.mode(), "Created checkout session");

        Ok(HostedCheckout {
            session_id: session.id.to_string(),
            checkout_url,
        })
    }
}

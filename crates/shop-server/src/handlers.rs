//! HTTP Handlers

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};

use shop_cart::Offering;
use shop_payments::{
    BillingCycle, CheckoutLineItem, CheckoutRequest, PaymentError, Plan, PlanListing,
    SIGNATURE_HEADER,
};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
    /// "enabled" or "bypass"
    pub webhook_verification: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

/// One cart line as sent by the storefront (prices come from the catalog)
#[derive(Debug, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CheckoutBody {
    Subscription {
        plan_slug: String,
        #[serde(default)]
        billing_cycle: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
    Cart {
        items: Vec<CartLine>,
        #[serde(default)]
        email: Option<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub session_id: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.stripe.is_some(),
        webhook_verification: if state.verifier.is_bypass() {
            "bypass"
        } else {
            "enabled"
        },
    })
}

/// Subscription plans with both cycle prices
pub async fn list_plans() -> Json<Vec<PlanListing>> {
    Json(Plan::catalog())
}

/// Stripe webhook handler
///
/// Verification failures are the only rejection; everything after that is
/// acknowledged so Stripe stops redelivering.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let event = state.verifier.verify(&body, signature).map_err(|e| {
        tracing::warn!(verified = false, error = %e, "Webhook rejected");
        let code = match e {
            PaymentError::Parse(_) => "INVALID_PAYLOAD",
            _ => "INVALID_SIGNATURE",
        };
        api_error(StatusCode::BAD_REQUEST, code, e.user_message())
    })?;

    let outcome = state.dispatcher.dispatch(&event).await;
    tracing::debug!(event_type = %event.event_type, outcome = ?outcome, "Webhook handled");

    Ok(Json(WebhookAck { status: "success" }))
}

/// Create Stripe checkout session
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutBody>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let stripe = state.stripe.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "PAYMENTS_DISABLED",
            "Payments not configured",
        )
    })?;

    let request = checkout_request(payload)?;

    let session = stripe.create_checkout_session(&request).await.map_err(|e| {
        tracing::error!(error = %e, "Checkout error");
        api_error(StatusCode::BAD_GATEWAY, "CHECKOUT_ERROR", e.user_message())
    })?;

    Ok(Json(CheckoutResponse {
        checkout_url: session.checkout_url,
        session_id: session.session_id,
    }))
}

/// Resolve plans and cart lines against the catalogs
fn checkout_request(body: CheckoutBody) -> Result<CheckoutRequest, ApiError> {
    match body {
        CheckoutBody::Subscription {
            plan_slug,
            billing_cycle,
            email,
        } => {
            let plan = Plan::from_slug(&plan_slug).ok_or_else(|| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    "UNKNOWN_PLAN",
                    format!("Unknown plan: {plan_slug}"),
                )
            })?;
            let cycle = match billing_cycle {
                Some(raw) => BillingCycle::parse(&raw).ok_or_else(|| {
                    api_error(
                        StatusCode::BAD_REQUEST,
                        "INVALID_BILLING_CYCLE",
                        format!("Unknown billing cycle: {raw}"),
                    )
                })?,
                None => BillingCycle::default(),
            };
            Ok(CheckoutRequest::Subscription { plan, cycle, email })
        }
        CheckoutBody::Cart { items, email } => {
            if items.is_empty() {
                return Err(api_error(StatusCode::BAD_REQUEST, "EMPTY_CART", "Cart is empty"));
            }

            let items = items
                .into_iter()
                .map(|line| {
                    let offering = Offering::find(&line.id).ok_or_else(|| {
                        api_error(
                            StatusCode::BAD_REQUEST,
                            "UNKNOWN_ITEM",
                            format!("Unknown item: {}", line.id),
                        )
                    })?;
                    Ok(CheckoutLineItem {
                        name: offering.name.to_string(),
                        description: Some(offering.description.to_string()),
                        unit_amount_cents: offering.price_cents,
                        quantity: u64::from(line.quantity.max(1)),
                    })
                })
                .collect::<Result<Vec<_>, ApiError>>()?;

            Ok(CheckoutRequest::Cart { items, email })
        }
    }
}

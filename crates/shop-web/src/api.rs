//! API Client

use serde::{Deserialize, Serialize};
use shop_cart::CartItem;

/// Body of `POST /api/checkout`
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CheckoutPayload {
    Subscription {
        plan_slug: String,
        billing_cycle: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
    Cart {
        items: Vec<CartItem>,
        #[serde(skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
}

/// One subscription plan as served by `GET /api/plans`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PlanListing {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub monthly_cents: i64,
    pub yearly_cents: i64,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    checkout_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    error: String,
}

fn api_url(path: &str) -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into());
    format!("{origin}{path}")
}

/// Create a Stripe checkout session and return the redirect URL
pub async fn create_checkout(payload: &CheckoutPayload) -> Result<String, String> {
    let client = reqwest::Client::new();

    let response = client
        .post(api_url("/api/checkout"))
        .json(payload)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        let data: CheckoutResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(data.checkout_url)
    } else {
        let data: ErrorResponse = response.json().await.unwrap_or_default();
        if data.error.is_empty() {
            Err("Failed to create checkout".into())
        } else {
            Err(data.error)
        }
    }
}

/// Load the plan table the server charges from
pub async fn fetch_plans() -> Result<Vec<PlanListing>, String> {
    let response = reqwest::get(api_url("/api/plans"))
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("Failed to load plans ({})", response.status()));
    }
    response.json().await.map_err(|e| e.to_string())
}

/// Send the browser to the hosted checkout page
pub fn redirect(url: &str) -> Result<(), String> {
    web_sys::window()
        .ok_or_else(|| "No browser window".to_string())?
        .location()
        .set_href(url)
        .map_err(|e| format!("Could not open checkout: {e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_cart::Offering;

    #[test]
    fn test_payload_shapes() {
        let subscription = serde_json::to_value(CheckoutPayload::Subscription {
            plan_slug: "growth".into(),
            billing_cycle: "yearly".into(),
            email: None,
        })
        .unwrap();
        assert_eq!(subscription["kind"], "subscription");
        assert_eq!(subscription["plan_slug"], "growth");
        assert!(subscription.get("email").is_none());

        let item = Offering::find("logo-design").unwrap().to_cart_item();
        let cart = serde_json::to_value(CheckoutPayload::Cart {
            items: vec![item],
            email: Some("buyer@example.com".into()),
        })
        .unwrap();
        assert_eq!(cart["kind"], "cart");
        assert_eq!(cart["items"][0]["id"], "logo-design");
        assert_eq!(cart["items"][0]["quantity"], 1);
    }

    #[test]
    fn test_plan_listing_shape() {
        let plans: Vec<PlanListing> = serde_json::from_value(serde_json::json!([{
            "slug": "growth",
            "name": "Growth",
            "description": "Everything in Essentials plus SEO and content",
            "monthly_cents": 9900,
            "yearly_cents": 99000,
            "featured": true,
            "highlights": ["SEO monitoring"]
        }]))
        .unwrap();
        assert_eq!(plans[0].yearly_cents, 99000);
        assert!(plans[0].featured);
        assert_eq!(plans[0].highlights, vec!["SEO monitoring".to_string()]);
    }
}

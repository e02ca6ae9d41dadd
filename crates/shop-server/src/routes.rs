//! Router

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::handlers::{create_checkout, health_check, list_plans, stripe_webhook};
use crate::state::AppState;

/// Build the application router
///
/// Unknown paths fall through to the web bundle; client-side routes get
/// `index.html`.
pub fn router(state: AppState, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let bundle = ServeDir::new(static_dir)
        .fallback(ServeFile::new(format!("{static_dir}/index.html")));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/plans", get(list_plans))
        .route("/api/checkout", post(create_checkout))
        .route("/api/webhooks/stripe", post(stripe_webhook))
        .fallback_service(bundle)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use shop_payments::{
        AccountProvisioner, AccountStore, EmailAddress, EventDispatcher, MemoryAccountStore,
        NotificationDispatcher, RecordingMailer, SIGNATURE_HEADER, WebhookVerifier,
        compute_signature,
    };
    use tower::ServiceExt;

    const SECRET: &str = "whsec_route_test";

    struct TestApp {
        router: Router,
        store: Arc<MemoryAccountStore>,
        mailer: Arc<RecordingMailer>,
    }

    fn app(secret: Option<&str>) -> TestApp {
        let store = Arc::new(MemoryAccountStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let state = AppState {
            verifier: Arc::new(WebhookVerifier::new(
                secret.map(|s| SecretString::from(s.to_string())),
            )),
            dispatcher: Arc::new(EventDispatcher::new(
                AccountProvisioner::new(store.clone()),
                NotificationDispatcher::new(mailer.clone(), "http://localhost:3000/login"),
            )),
            stripe: None,
        };
        TestApp {
            router: router(state, "static-test-missing"),
            store,
            mailer,
        }
    }

    fn checkout_body(mode: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_route_1",
            "type": "checkout.session.completed",
            "data": { "object": {
                "mode": mode,
                "customer_email": "new@example.com",
                "metadata": { "plan_slug": "essentials" },
                "amount_total": 4900,
                "currency": "usd"
            }}
        }))
        .unwrap()
    }

    fn signed_request(body: Vec<u8>) -> Request<Body> {
        let elapsed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap();
        let timestamp = i64::try_from(elapsed.as_secs()).unwrap();
        let signature = compute_signature(SECRET, timestamp, &body).unwrap();

        Request::post("/api/webhooks/stripe")
            .header(SIGNATURE_HEADER, format!("t={timestamp},v1={signature}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(None);
        let response = app
            .router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["stripe_configured"], false);
        assert_eq!(body["webhook_verification"], "bypass");
    }

    #[tokio::test]
    async fn test_plans_listed_from_price_table() {
        let app = app(None);
        let response = app
            .router
            .oneshot(Request::get("/api/plans").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let plans = body.as_array().unwrap();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0]["slug"], "essentials");
        assert_eq!(plans[0]["monthly_cents"], 4900);
        assert_eq!(plans[0]["yearly_cents"], 49000);
        assert_eq!(plans[1]["featured"], true);
        assert!(plans[2]["highlights"].as_array().is_some_and(|h| !h.is_empty()));
    }

    #[tokio::test]
    async fn test_signed_webhook_provisions_once() {
        let app = app(Some(SECRET));

        for _ in 0..2 {
            let response = app
                .router
                .clone()
                .oneshot(signed_request(checkout_body("subscription")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(json_body(response).await["status"], "success");
        }

        assert_eq!(app.store.len().await, 1);
        let account = app
            .store
            .find_by_email(&EmailAddress::parse("new@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.subscription.plan_name, "Essentials");
        assert_eq!(app.mailer.sent().await.len(), 2);
    }

    #[tokio::test]
    async fn test_bad_signature_rejected() {
        let app = app(Some(SECRET));
        let request = Request::post("/api/webhooks/stripe")
            .header(SIGNATURE_HEADER, "t=1,v1=deadbeef")
            .body(Body::from(checkout_body("subscription")))
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_SIGNATURE");
        assert!(app.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_signature_rejected() {
        let app = app(Some(SECRET));
        let request = Request::post("/api/webhooks/stripe")
            .body(Body::from(checkout_body("subscription")))
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_payment_mode_acknowledged_without_account() {
        let app = app(Some(SECRET));
        let response = app
            .router
            .oneshot(signed_request(checkout_body("payment")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(app.store.is_empty().await);
        assert!(app.mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_bypass_mode_accepts_unsigned() {
        let app = app(None);
        let request = Request::post("/api/webhooks/stripe")
            .body(Body::from(checkout_body("subscription")))
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_signed_event_with_odd_object_acknowledged() {
        let app = app(Some(SECRET));

        for body in [
            json!({
                "type": "customer.subscription.updated",
                "data": { "object": { "id": "sub_1", "status": { "code": "active" } } }
            }),
            json!({
                "type": "checkout.session.completed",
                "data": { "object": { "mode": "subscription", "customer_email": ["new@example.com"] } }
            }),
        ] {
            let response = app
                .router
                .clone()
                .oneshot(signed_request(serde_json::to_vec(&body).unwrap()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(json_body(response).await["status"], "success");
        }

        assert!(app.store.is_empty().await);
        assert!(app.mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let app = app(None);
        let request = Request::post("/api/webhooks/stripe")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_PAYLOAD");
    }

    #[tokio::test]
    async fn test_checkout_unconfigured() {
        let app = app(None);
        let request = Request::post("/api/checkout")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "kind": "subscription", "plan_slug": "growth" }).to_string(),
            ))
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["code"], "PAYMENTS_DISABLED");
    }
}

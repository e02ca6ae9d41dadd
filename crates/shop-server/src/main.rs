//! Storefront HTTP Server
//!
//! Axum service that receives payment webhooks, creates hosted checkout
//! sessions and serves the WASM storefront.

mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shop_payments::{
    AccountProvisioner, AccountStore, EventDispatcher, HttpMailer, LogMailer, Mailer,
    MemoryAccountStore, NotificationDispatcher, PgAccountStore, StripeClient, WebhookVerifier,
};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Account storage
    let store: Arc<dyn AccountStore> = match &config.database_url {
        Some(url) => {
            let store = PgAccountStore::connect(url.expose_secret()).await?;
            store.migrate().await?;
            tracing::info!("✓ PostgreSQL account store ready");
            Arc::new(store)
        }
        None => {
            tracing::warn!("⚠ DATABASE_URL not set - accounts kept in memory only");
            Arc::new(MemoryAccountStore::new())
        }
    };

    // Email transport
    let mailer: Arc<dyn Mailer> = match &config.email.api_key {
        Some(key) => Arc::new(HttpMailer::new(
            config.email.api_url.clone(),
            key.clone(),
            config.email.from.clone(),
        )?),
        None => {
            tracing::warn!("⚠ EMAIL_API_KEY not set - confirmations are logged, not sent");
            Arc::new(LogMailer)
        }
    };
    tracing::info!(mailer = mailer.name(), "Email transport selected");

    // Webhook verification
    let verifier = WebhookVerifier::new(config.webhook_secret.clone())
        .with_tolerance(config.signature_tolerance_secs);
    if verifier.is_bypass() {
        tracing::warn!("⚠ STRIPE_WEBHOOK_SECRET not set - webhooks accepted UNVERIFIED");
        tracing::warn!("  Use this only for local testing");
    } else {
        tracing::info!("✓ Webhook signature verification enabled");
    }

    // Hosted checkout
    let stripe = config
        .stripe_secret_key
        .as_ref()
        .map(|key| Arc::new(StripeClient::new(key, config.public_base_url.clone())));
    if stripe.is_some() {
        tracing::info!("✓ Stripe configured");
    } else {
        tracing::warn!("⚠ Stripe not configured - checkout disabled");
        tracing::warn!("  Set STRIPE_SECRET_KEY in .env");
    }

    // Sign-in link in confirmation emails
    let login_url = config.login_url();
    if config.login_url_override.is_some() {
        tracing::info!(login_url = %login_url, "✓ Login URL configured");
    } else {
        tracing::warn!(login_url = %login_url, "⚠ LOGIN_URL not set - emails link to the default sign-in path");
        tracing::warn!("  Point LOGIN_URL at your auth backend's sign-in page");
    }

    let dispatcher = EventDispatcher::new(
        AccountProvisioner::new(store),
        NotificationDispatcher::new(mailer, login_url),
    );

    let state = AppState {
        verifier: Arc::new(verifier),
        dispatcher: Arc::new(dispatcher),
        stripe,
    };

    let app = routes::router(state, &config.static_dir);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 storefront server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  GET  /api/plans           - Subscription plans");
    tracing::info!("  POST /api/checkout        - Create Stripe checkout");
    tracing::info!("  POST /api/webhooks/stripe - Stripe webhook");

    axum::serve(listener, app).await?;

    Ok(())
}

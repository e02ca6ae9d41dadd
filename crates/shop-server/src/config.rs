//! Server configuration
//!
//! Read from the process environment (after `.env` is loaded). Every
//! integration is optional; a missing secret disables the feature it guards.

use secrecy::SecretString;
use shop_payments::{DEFAULT_EMAIL_API_URL, DEFAULT_TOLERANCE_SECS};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Email transport settings
#[derive(Debug)]
pub struct EmailConfig {
    /// `None` selects the log-only transport
    pub api_key: Option<SecretString>,
    pub api_url: String,
    pub from: String,
}

/// Server configuration
#[derive(Debug)]
pub struct Config {
    pub bind_addr: String,
    /// Base for checkout redirects and the default login link
    pub public_base_url: String,
    /// Sign-in page of the external auth backend
    pub login_url_override: Option<String>,
    /// `None` runs webhook verification in bypass mode
    pub webhook_secret: Option<SecretString>,
    pub signature_tolerance_secs: i64,
    /// `None` disables hosted checkout
    pub stripe_secret_key: Option<SecretString>,
    /// `None` selects the in-memory account store
    pub database_url: Option<SecretString>,
    pub email: EmailConfig,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secret = |var: &str| get(var).map(SecretString::from);

        let signature_tolerance_secs = match get("STRIPE_SIGNATURE_TOLERANCE_SECS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    var: "STRIPE_SIGNATURE_TOLERANCE_SECS",
                    reason: format!("expected a positive number of seconds, got {raw:?}"),
                })?,
            None => DEFAULT_TOLERANCE_SECS,
        };

        let public_base_url = get("PUBLIC_BASE_URL").unwrap_or_else(|| "http://localhost:3000".into());
        if !public_base_url.starts_with("http://") && !public_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "PUBLIC_BASE_URL",
                reason: "must start with http:// or https://".into(),
            });
        }

        let login_url_override = get("LOGIN_URL");
        if let Some(url) = &login_url_override {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    var: "LOGIN_URL",
                    reason: "must be an absolute http:// or https:// URL".into(),
                });
            }
        }

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            login_url_override,
            webhook_secret: secret("STRIPE_WEBHOOK_SECRET"),
            signature_tolerance_secs,
            stripe_secret_key: secret("STRIPE_SECRET_KEY"),
            database_url: secret("DATABASE_URL"),
            email: EmailConfig {
                api_key: secret("EMAIL_API_KEY"),
                api_url: get("EMAIL_API_URL").unwrap_or_else(|| DEFAULT_EMAIL_API_URL.into()),
                from: get("EMAIL_FROM").unwrap_or_else(|| "Storefront <no-reply@localhost>".into()),
            },
            static_dir: get("STATIC_DIR").unwrap_or_else(|| "static".into()),
        })
    }

    /// Where new customers sign in; `LOGIN_URL` or `{PUBLIC_BASE_URL}/login`
    pub fn login_url(&self) -> String {
        self.login_url_override
            .clone()
            .unwrap_or_else(|| format!("{}/login", self.public_base_url))
    }
}

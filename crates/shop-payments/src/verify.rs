//! Webhook Verification
//!
//! Checks `Stripe-Signature` headers (`t=<unix>,v1=<hex>`) against the shared
//! secret using HMAC-SHA256 over `"<t>.<body>"`, with a recency window.
//!
//! Without a configured secret the verifier runs in bypass mode: bodies are
//! parsed as-is and tagged [`Verification::Unverified`]. That mode exists for
//! local testing only.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::{PaymentError, Result};
use crate::event::{PaymentEvent, Verification};

/// Header carrying the signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Default recency window (seconds)
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

/// Parsed components of the signature header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// All `v1` signatures (several during secret rotation)
    pub signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parse `t=<timestamp>,v1=<hex>[,v1=<hex>...]`; unknown keys are ignored
    pub fn parse(header: &str) -> Result<Self> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                return Err(PaymentError::SignatureInvalid("malformed signature header".into()));
            };

            match key {
                "t" => {
                    timestamp = Some(value.parse::<i64>().map_err(|_| {
                        PaymentError::SignatureInvalid("invalid timestamp".into())
                    })?);
                }
                "v1" => {
                    // undecodable entries simply never match
                    if let Ok(sig) = hex::decode(value) {
                        signatures.push(sig);
                    }
                }
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| PaymentError::SignatureInvalid("missing timestamp".into()))?;
        if signatures.is_empty() {
            return Err(PaymentError::SignatureInvalid("missing v1 signature".into()));
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

/// Compute the hex `v1` signature for a payload
///
/// Useful for signing fixtures and local test deliveries.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String> {
    let mac = signed_mac(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Config(format!("webhook secret: {e}")))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Authenticates inbound webhook deliveries
pub struct WebhookVerifier {
    secret: Option<SecretString>,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    /// `None` puts the verifier in unverified bypass mode
    pub fn new(secret: Option<SecretString>) -> Self {
        Self {
            secret,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// True when no secret is configured
    pub fn is_bypass(&self) -> bool {
        self.secret.is_none()
    }

    /// Verify against the current time
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<PaymentEvent> {
        self.verify_at(payload, signature, chrono::Utc::now().timestamp())
    }

    /// Verify against an explicit clock (unix seconds)
    pub fn verify_at(&self, payload: &[u8], signature: Option<&str>, now: i64) -> Result<PaymentEvent> {
        let Some(secret) = &self.secret else {
            let event = PaymentEvent::parse(payload, Verification::Unverified)?;
            tracing::warn!(
                verified = false,
                event_type = %event.event_type,
                "Accepted webhook in UNVERIFIED mode (no webhook secret configured)"
            );
            return Ok(event);
        };

        let header = signature
            .ok_or_else(|| PaymentError::SignatureInvalid("missing signature header".into()))?;
        let header = SignatureHeader::parse(header)?;

        if now.abs_diff(header.timestamp) > self.tolerance_secs.unsigned_abs() {
            return Err(PaymentError::SignatureInvalid(
                "timestamp outside tolerance".into(),
            ));
        }

        let expected = signed_mac(secret.expose_secret(), header.timestamp, payload)?;
        let matched = header
            .signatures
            .iter()
            .any(|sig| expected.clone().verify_slice(sig).is_ok());

        if !matched {
            return Err(PaymentError::SignatureInvalid("no matching signature".into()));
        }

        let event = PaymentEvent::parse(payload, Verification::Verified)?;
        tracing::info!(
            verified = true,
            event_id = ?event.id,
            event_type = %event.event_type,
            "Webhook signature verified"
        );
        Ok(event)
    }
}

//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Webhook signature missing, mismatched or stale
    #[error("Webhook signature invalid: {0}")]
    SignatureInvalid(String),

    /// Webhook payload could not be parsed into an event
    #[error("Webhook parse error: {0}")]
    Parse(String),

    /// Completed checkout carries no usable customer email
    #[error("Checkout has no customer email")]
    MissingIdentity,

    /// Account storage backend failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// An account already exists for this email (uniqueness violation)
    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    /// Confirmation message could not be rendered or delivered
    #[error("Notification failed: {0}")]
    Notification(String),

    /// Credential generation or hashing failed
    #[error("Credential error: {0}")]
    Credential(String),

    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::Stripe(_) | PaymentError::Storage(_) | PaymentError::Notification(_)
        )
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::SignatureInvalid(_) => "Invalid webhook signature.",
            PaymentError::Parse(_) => "Malformed webhook payload.",
            PaymentError::Stripe(_) => "Payment processing failed. Please try again.",
            PaymentError::Config(_) => "Service configuration error.",
            _ => "An error occurred processing your request.",
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Parse(err.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for PaymentError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PaymentError::DuplicateAccount(db.message().to_string())
            }
            _ => PaymentError::Storage(err.to_string()),
        }
    }
}

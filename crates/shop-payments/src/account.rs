//! User Accounts
//!
//! Accounts are keyed by normalized email. The store port distinguishes
//! "not found" (`Ok(None)`) from a backend failure (`Err`), and reports a
//! uniqueness violation on create as [`PaymentError::DuplicateAccount`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PaymentError, Result};
use crate::plan::BillingCycle;

/// Current account record layout
pub const ACCOUNT_SCHEMA_VERSION: i32 = 1;

/// Normalized (trimmed, lower-cased) email address
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalize a raw address; `None` when empty or not an address
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        let (local, domain) = normalized.split_once('@')?;

        if local.is_empty() || domain.is_empty() || normalized.contains(char::is_whitespace) {
            return None;
        }

        Some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Plan and subscription fields rewritten on every completed checkout
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFields {
    pub plan_name: String,
    pub plan_slug: Option<String>,
    pub billing_cycle: Option<BillingCycle>,
    pub subscription_id: Option<String>,
    pub customer_id: Option<String>,
}

/// A provisioned account (the credential hash is never exposed here)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: AccountId,
    pub email: EmailAddress,
    pub display_name: Option<String>,
    pub subscription: SubscriptionFields,
    pub schema_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for account creation
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub email: EmailAddress,
    pub display_name: Option<String>,
    /// Argon2id PHC string
    pub credential_hash: String,
    pub subscription: SubscriptionFields,
}

/// Account storage trait
///
/// Implementations must enforce at most one account per email at the
/// storage layer; concurrent creators rely on it.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find by normalized email
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<UserAccount>>;

    /// Create; fails with `DuplicateAccount` if the email is taken
    async fn create(&self, account: NewAccount) -> Result<UserAccount>;

    /// Overwrite the plan/subscription fields of an existing account
    async fn update_subscription(
        &self,
        id: &AccountId,
        fields: &SubscriptionFields,
    ) -> Result<UserAccount>;
}

struct StoredAccount {
    account: UserAccount,
    credential_hash: String,
}

#[derive(Default)]
struct Accounts {
    by_email: HashMap<EmailAddress, StoredAccount>,
    by_id: HashMap<AccountId, EmailAddress>,
}

/// In-memory account store (for development and tests)
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<Accounts>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.by_email.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    #[cfg(test)]
    pub(crate) async fn credential_hash(&self, email: &EmailAddress) -> Option<String> {
        self.accounts
            .read()
            .await
            .by_email
            .get(email)
            .map(|stored| stored.credential_hash.clone())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<UserAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.by_email.get(email).map(|stored| stored.account.clone()))
    }

    async fn create(&self, account: NewAccount) -> Result<UserAccount> {
        let mut accounts = self.accounts.write().await;

        if accounts.by_email.contains_key(&account.email) {
            return Err(PaymentError::DuplicateAccount(account.email.to_string()));
        }

        let now = Utc::now();
        let created = UserAccount {
            id: AccountId::new(),
            email: account.email.clone(),
            display_name: account.display_name,
            subscription: account.subscription,
            schema_version: ACCOUNT_SCHEMA_VERSION,
            created_at: now,
            updated_at: now,
        };

        accounts.by_id.insert(created.id, created.email.clone());
        accounts.by_email.insert(
            account.email,
            StoredAccount {
                account: created.clone(),
                credential_hash: account.credential_hash,
            },
        );

        Ok(created)
    }

    async fn update_subscription(
        &self,
        id: &AccountId,
        fields: &SubscriptionFields,
    ) -> Result<UserAccount> {
        let mut accounts = self.accounts.write().await;

        let email = accounts
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| PaymentError::Storage(format!("account {id} not found")))?;

        let stored = accounts
            .by_email
            .get_mut(&email)
            .ok_or_else(|| PaymentError::Storage(format!("account {id} index out of sync")))?;

        stored.account.subscription = fields.clone();
        stored.account.updated_at = Utc::now();

        Ok(stored.account.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: EmailAddress::parse(email).unwrap(),
            display_name: Some("Ada".into()),
            credential_hash: "$argon2id$stub".into(),
            subscription: SubscriptionFields {
                plan_name: "Essentials".into(),
                plan_slug: Some("essentials".into()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_email_normalization() {
        let email = EmailAddress::parse("  New@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "new@example.com");
        assert!(EmailAddress::parse("").is_none());
        assert!(EmailAddress::parse("   ").is_none());
        assert!(EmailAddress::parse("no-at-sign").is_none());
        assert!(EmailAddress::parse("@example.com").is_none());
        assert!(EmailAddress::parse("a b@example.com").is_none());
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryAccountStore::new();
        let created = store.create(new_account("new@example.com")).await.unwrap();

        let email = EmailAddress::parse("NEW@example.com").unwrap();
        let found = store.find_by_email(&email).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.schema_version, ACCOUNT_SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_missing_is_none() {
        let store = MemoryAccountStore::new();
        let email = EmailAddress::parse("ghost@example.com").unwrap();
        assert!(store.find_by_email(&email).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let store = MemoryAccountStore::new();
        store.create(new_account("new@example.com")).await.unwrap();

        let err = store.create(new_account("New@Example.com")).await.unwrap_err();
        assert!(matches!(err, PaymentError::DuplicateAccount(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_subscription() {
        let store = MemoryAccountStore::new();
        let created = store.create(new_account("new@example.com")).await.unwrap();

        let fields = SubscriptionFields {
            plan_name: "Growth".into(),
            plan_slug: Some("growth".into()),
            billing_cycle: Some(BillingCycle::Yearly),
            subscription_id: Some("sub_2".into()),
            customer_id: Some("cus_1".into()),
        };
        let updated = store.update_subscription(&created.id, &fields).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.subscription, fields);
        assert_eq!(updated.display_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_update_unknown_account() {
        let store = MemoryAccountStore::new();
        let result = store
            .update_subscription(&AccountId::new(), &SubscriptionFields::default())
            .await;
        assert!(matches!(result, Err(PaymentError::Storage(_))));
    }
}

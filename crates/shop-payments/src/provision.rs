//! Account Provisioning
//!
//! Maps a completed subscription checkout onto exactly one account per
//! normalized email.
//!
//! ```text
//!   find_by_email ──found──▶ update_subscription ──▶ is_new_user = false
//!        │
//!      absent
//!        ▼
//!   generate credential ──▶ create ──ok──▶ is_new_user = true (credential returned once)
//!                              │
//!                          duplicate (lost a race)
//!                              ▼
//!                  find_by_email ──▶ update_subscription ──▶ is_new_user = false
//! ```

use std::sync::Arc;

use crate::account::{AccountStore, EmailAddress, NewAccount, SubscriptionFields, UserAccount};
use crate::credential::Credential;
use crate::error::{PaymentError, Result};
use crate::event::{CheckoutSession, Expandable};
use crate::plan::{BillingCycle, resolve_plan_name};

/// Receipt details for the confirmation message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub plan_name: String,
    /// Minor units (cents)
    pub amount: i64,
    /// ISO code, upper-cased
    pub currency: String,
    pub invoice_id: Option<String>,
    pub invoice_url: Option<String>,
}

impl Receipt {
    /// Amount formatted with two decimals
    pub fn formatted_amount(&self) -> String {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Everything the provisioner needs from a completed checkout
#[derive(Clone, Debug)]
pub struct CheckoutDetails {
    pub email: EmailAddress,
    pub display_name: Option<String>,
    pub subscription: SubscriptionFields,
    pub receipt: Receipt,
}

impl CheckoutDetails {
    /// Extract and normalize; fails with `MissingIdentity` without an email
    pub fn from_session(session: &CheckoutSession) -> Result<Self> {
        let email = session
            .raw_email()
            .and_then(EmailAddress::parse)
            .ok_or(PaymentError::MissingIdentity)?;

        let plan_name = resolve_plan_name(session.plan_slug(), session.product_name());

        let subscription = SubscriptionFields {
            plan_name: plan_name.clone(),
            plan_slug: session.plan_slug().map(|s| s.trim().to_lowercase()),
            billing_cycle: session.billing_cycle().and_then(BillingCycle::parse),
            subscription_id: session.subscription.as_ref().map(|s| s.id().to_string()),
            customer_id: session.customer.as_ref().map(|c| c.id().to_string()),
        };

        let receipt = Receipt {
            plan_name,
            amount: session.amount_total.unwrap_or(0),
            currency: session
                .currency
                .as_deref()
                .unwrap_or("usd")
                .to_uppercase(),
            invoice_id: session.invoice.as_ref().map(|i| i.id().to_string()),
            invoice_url: session
                .invoice
                .as_ref()
                .and_then(Expandable::hosted_invoice_url)
                .map(str::to_string),
        };

        Ok(Self {
            email,
            display_name: session
                .customer_name()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            subscription,
            receipt,
        })
    }
}

/// Result of applying one completed checkout
#[derive(Debug)]
pub struct ProvisioningOutcome {
    pub account: UserAccount,
    /// Present only when the account was created by this call
    pub credential: Option<Credential>,
    pub is_new_user: bool,
}

/// Idempotent account provisioner
pub struct AccountProvisioner {
    store: Arc<dyn AccountStore>,
}

impl AccountProvisioner {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Create or update the account for this checkout
    pub async fn provision(&self, details: &CheckoutDetails) -> Result<ProvisioningOutcome> {
        if let Some(existing) = self.store.find_by_email(&details.email).await? {
            return self.update_existing(existing, details).await;
        }

        let credential = Credential::generate();
        let new_account = NewAccount {
            email: details.email.clone(),
            display_name: details.display_name.clone(),
            credential_hash: credential.hash()?,
            subscription: details.subscription.clone(),
        };

        match self.store.create(new_account).await {
            Ok(account) => {
                tracing::info!(
                    account_id = %account.id,
                    email = %account.email,
                    plan = %account.subscription.plan_name,
                    is_new_user = true,
                    "Created new account"
                );
                Ok(ProvisioningOutcome {
                    account,
                    credential: Some(credential),
                    is_new_user: true,
                })
            }
            Err(PaymentError::DuplicateAccount(_)) => {
                tracing::info!(
                    email = %details.email,
                    "Account created concurrently, falling back to update"
                );
                let existing = self
                    .store
                    .find_by_email(&details.email)
                    .await?
                    .ok_or_else(|| {
                        PaymentError::Storage(format!(
                            "account for {} reported duplicate but not found",
                            details.email
                        ))
                    })?;
                self.update_existing(existing, details).await
            }
            Err(e) => Err(e),
        }
    }

    async fn update_existing(
        &self,
        existing: UserAccount,
        details: &CheckoutDetails,
    ) -> Result<ProvisioningOutcome> {
        let account = self
            .store
            .update_subscription(&existing.id, &details.subscription)
            .await?;

        tracing::info!(
            account_id = %account.id,
            email = %account.email,
            plan = %account.subscription.plan_name,
            is_new_user = false,
            "Updated existing account"
        );

        Ok(ProvisioningOutcome {
            account,
            credential: None,
            is_new_user: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AccountId, MemoryAccountStore};
    use crate::credential::verify_credential;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn session(value: serde_json::Value) -> CheckoutSession {
        serde_json::from_value(value).unwrap()
    }

    fn essentials_checkout() -> CheckoutDetails {
        CheckoutDetails::from_session(&session(json!({
            "mode": "subscription",
            "customer_email": "New@Example.com",
            "customer_details": { "name": "Ada Lovelace" },
            "subscription": "sub_1",
            "customer": "cus_1",
            "metadata": { "plan_slug": "essentials", "billing_cycle": "monthly" },
            "amount_total": 4900,
            "currency": "usd"
        })))
        .unwrap()
    }

    #[test]
    fn test_details_extraction() {
        let details = essentials_checkout();
        assert_eq!(details.email.as_str(), "new@example.com");
        assert_eq!(details.display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(details.subscription.plan_name, "Essentials");
        assert_eq!(details.subscription.billing_cycle, Some(BillingCycle::Monthly));
        assert_eq!(details.subscription.subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(details.receipt.currency, "USD");
        assert_eq!(details.receipt.formatted_amount(), "49.00");
    }

    #[test]
    fn test_missing_identity() {
        for value in [
            json!({ "mode": "subscription" }),
            json!({ "customer_email": "   " }),
            json!({ "customer_details": { "email": "" } }),
        ] {
            let result = CheckoutDetails::from_session(&session(value));
            assert!(matches!(result, Err(PaymentError::MissingIdentity)));
        }
    }

    #[test]
    fn test_plan_name_fallback() {
        let details = CheckoutDetails::from_session(&session(json!({
            "customer_email": "a@example.com",
            "line_items": { "data": [{ "description": "Custom Retainer" }] }
        })))
        .unwrap();
        assert_eq!(details.subscription.plan_name, "Custom Retainer");
    }

    #[tokio::test]
    async fn test_new_account_gets_credential() {
        let store = Arc::new(MemoryAccountStore::new());
        let provisioner = AccountProvisioner::new(store.clone());

        let outcome = provisioner.provision(&essentials_checkout()).await.unwrap();
        assert!(outcome.is_new_user);

        let credential = outcome.credential.expect("credential for new user");
        let hash = store.credential_hash(&outcome.account.email).await.unwrap();
        assert_ne!(hash, credential.expose());
        assert!(verify_credential(credential.expose(), &hash));
    }

    #[tokio::test]
    async fn test_redelivery_is_idempotent() {
        let store = Arc::new(MemoryAccountStore::new());
        let provisioner = AccountProvisioner::new(store.clone());
        let details = essentials_checkout();

        let first = provisioner.provision(&details).await.unwrap();
        let second = provisioner.provision(&details).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert!(first.is_new_user);
        assert!(!second.is_new_user);
        assert!(second.credential.is_none());
        assert_eq!(first.account.id, second.account.id);
        assert_eq!(first.account.email, second.account.email);
        assert_eq!(second.account.subscription, details.subscription);
    }

    #[tokio::test]
    async fn test_later_checkout_updates_plan() {
        let store = Arc::new(MemoryAccountStore::new());
        let provisioner = AccountProvisioner::new(store.clone());
        provisioner.provision(&essentials_checkout()).await.unwrap();

        let mut upgrade = essentials_checkout();
        upgrade.subscription.plan_name = "Premium".into();
        upgrade.subscription.plan_slug = Some("premium".into());
        upgrade.subscription.subscription_id = Some("sub_2".into());

        let outcome = provisioner.provision(&upgrade).await.unwrap();
        assert!(!outcome.is_new_user);
        assert_eq!(outcome.account.subscription.plan_name, "Premium");
        assert_eq!(outcome.account.subscription.subscription_id.as_deref(), Some("sub_2"));
    }

    #[tokio::test]
    async fn test_concurrent_deliveries_create_once() {
        let store = Arc::new(YieldingStore::default());
        let provisioner = Arc::new(AccountProvisioner::new(store.clone()));
        let details = essentials_checkout();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let provisioner = provisioner.clone();
                let details = details.clone();
                tokio::spawn(async move { provisioner.provision(&details).await })
            })
            .collect();

        let mut new_users = 0;
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            if outcome.is_new_user {
                new_users += 1;
            }
        }

        assert_eq!(new_users, 1);
        assert_eq!(store.inner.len().await, 1);
        // lookups interleaved, so the losers went through the duplicate fallback
        assert!(store.duplicates.load(Ordering::SeqCst) > 0);
    }

    /// Yields after each lookup so concurrent deliveries interleave between
    /// find and create; counts creates rejected as duplicates.
    #[derive(Default)]
    struct YieldingStore {
        inner: MemoryAccountStore,
        duplicates: AtomicUsize,
    }

    #[async_trait]
    impl AccountStore for YieldingStore {
        async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<UserAccount>> {
            let found = self.inner.find_by_email(email).await;
            tokio::task::yield_now().await;
            found
        }

        async fn create(&self, account: NewAccount) -> Result<UserAccount> {
            let result = self.inner.create(account).await;
            if matches!(result, Err(PaymentError::DuplicateAccount(_))) {
                self.duplicates.fetch_add(1, Ordering::SeqCst);
            }
            result
        }

        async fn update_subscription(
            &self,
            id: &AccountId,
            fields: &SubscriptionFields,
        ) -> Result<UserAccount> {
            self.inner.update_subscription(id, fields).await
        }
    }

    /// Hides the account from the first lookup, as if another instance
    /// created it between our find and create.
    struct RacingStore {
        inner: MemoryAccountStore,
        hidden_once: AtomicBool,
    }

    #[async_trait]
    impl AccountStore for RacingStore {
        async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<UserAccount>> {
            if !self.hidden_once.swap(true, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_by_email(email).await
        }

        async fn create(&self, account: NewAccount) -> Result<UserAccount> {
            self.inner.create(account).await
        }

        async fn update_subscription(
            &self,
            id: &AccountId,
            fields: &SubscriptionFields,
        ) -> Result<UserAccount> {
            self.inner.update_subscription(id, fields).await
        }
    }

    #[tokio::test]
    async fn test_lost_race_falls_back_to_update() {
        let inner = MemoryAccountStore::new();
        let details = essentials_checkout();
        inner
            .create(NewAccount {
                email: details.email.clone(),
                display_name: None,
                credential_hash: "$argon2id$existing".into(),
                subscription: SubscriptionFields::default(),
            })
            .await
            .unwrap();

        let store = Arc::new(RacingStore {
            inner,
            hidden_once: AtomicBool::new(false),
        });
        let provisioner = AccountProvisioner::new(store.clone());

        let outcome = provisioner.provision(&details).await.unwrap();
        assert!(!outcome.is_new_user);
        assert!(outcome.credential.is_none());
        assert_eq!(outcome.account.subscription.plan_name, "Essentials");
        assert_eq!(store.inner.len().await, 1);
    }

    struct DownStore;

    #[async_trait]
    impl AccountStore for DownStore {
        async fn find_by_email(&self, _email: &EmailAddress) -> Result<Option<UserAccount>> {
            Err(PaymentError::Storage("connection refused".into()))
        }

        async fn create(&self, _account: NewAccount) -> Result<UserAccount> {
            Err(PaymentError::Storage("connection refused".into()))
        }

        async fn update_subscription(
            &self,
            _id: &AccountId,
            _fields: &SubscriptionFields,
        ) -> Result<UserAccount> {
            Err(PaymentError::Storage("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let provisioner = AccountProvisioner::new(Arc::new(DownStore));
        let result = provisioner.provision(&essentials_checkout()).await;
        assert!(matches!(result, Err(PaymentError::Storage(_))));
    }
}

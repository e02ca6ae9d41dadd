//! PostgreSQL account store
//!
//! Email uniqueness is enforced by the `user_accounts_email_key` index, so
//! concurrent creators across process instances collapse to one row; the
//! loser sees [`PaymentError::DuplicateAccount`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::account::{
    ACCOUNT_SCHEMA_VERSION, AccountId, AccountStore, EmailAddress, NewAccount, SubscriptionFields,
    UserAccount,
};
use crate::error::{PaymentError, Result};
use crate::plan::BillingCycle;

const ACCOUNT_COLUMNS: &str = "id, email, display_name, plan_name, plan_slug, billing_cycle, \
     stripe_subscription_id, stripe_customer_id, schema_version, created_at, updated_at";

/// PostgreSQL-backed account store
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Connect with default pool settings
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| PaymentError::Storage(format!("failed to connect postgres: {e}")))?;
        Ok(Self { pool })
    }

    /// Apply pending migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PaymentError::Storage(format!("migration failed: {e}")))?;
        tracing::info!("Account store migrations applied");
        Ok(())
    }
}

fn account_from_row(row: &PgRow) -> Result<UserAccount> {
    let raw_email: String = row.try_get("email")?;
    let email = EmailAddress::parse(&raw_email)
        .ok_or_else(|| PaymentError::Storage(format!("stored email is invalid: {raw_email}")))?;
    let billing_cycle: Option<String> = row.try_get("billing_cycle")?;

    Ok(UserAccount {
        id: AccountId::from_uuid(row.try_get::<Uuid, _>("id")?),
        email,
        display_name: row.try_get("display_name")?,
        subscription: SubscriptionFields {
            plan_name: row.try_get("plan_name")?,
            plan_slug: row.try_get("plan_slug")?,
            billing_cycle: billing_cycle.as_deref().and_then(BillingCycle::parse),
            subscription_id: row.try_get("stripe_subscription_id")?,
            customer_id: row.try_get("stripe_customer_id")?,
        },
        schema_version: row.try_get("schema_version")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<UserAccount>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM user_accounts WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn create(&self, account: NewAccount) -> Result<UserAccount> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO user_accounts \
             (id, email, display_name, credential_hash, plan_name, plan_slug, billing_cycle, \
              stripe_subscription_id, stripe_customer_id, schema_version, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(account.email.as_str())
        .bind(account.display_name.as_deref())
        .bind(&account.credential_hash)
        .bind(&account.subscription.plan_name)
        .bind(account.subscription.plan_slug.as_deref())
        .bind(account.subscription.billing_cycle.map(|c| c.as_str()))
        .bind(account.subscription.subscription_id.as_deref())
        .bind(account.subscription.customer_id.as_deref())
        .bind(ACCOUNT_SCHEMA_VERSION)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        account_from_row(&row)
    }

    async fn update_subscription(
        &self,
        id: &AccountId,
        fields: &SubscriptionFields,
    ) -> Result<UserAccount> {
        let row = sqlx::query(&format!(
            "UPDATE user_accounts SET \
             plan_name = $2, plan_slug = $3, billing_cycle = $4, \
             stripe_subscription_id = $5, stripe_customer_id = $6, updated_at = $7 \
             WHERE id = $1 \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(&fields.plan_name)
        .bind(fields.plan_slug.as_deref())
        .bind(fields.billing_cycle.map(|c| c.as_str()))
        .bind(fields.subscription_id.as_deref())
        .bind(fields.customer_id.as_deref())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => account_from_row(&row),
            None => Err(PaymentError::Storage(format!("account {id} not found"))),
        }
    }
}

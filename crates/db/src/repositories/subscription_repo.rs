//! Repository for the `subscriptions` table.

use sqlx::PgPool;

use servia_core::types::{DbId, Timestamp};

use crate::models::subscription::Subscription;

/// Column list for `subscriptions` queries.
const COLUMNS: &str = "\
    id, user_id, customer_id, subscription_id, price_id, current_period_end, \
    created_at, updated_at";

/// Provides lookup and webhook-driven upserts for subscription state.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Find the subscription row for an account, if any.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the subscription row by provider customer id.
    pub async fn find_by_customer(
        pool: &PgPool,
        customer_id: &str,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE customer_id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }

    /// Record the provider customer id for an account, creating the row if
    /// needed. Called when a checkout session is first set up.
    pub async fn upsert_customer(
        pool: &PgPool,
        user_id: DbId,
        customer_id: &str,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (user_id, customer_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_subscriptions_user
             DO UPDATE SET customer_id = EXCLUDED.customer_id, updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .bind(customer_id)
            .fetch_one(pool)
            .await
    }

    /// Apply a provider webhook: store the full subscription snapshot.
    pub async fn upsert_from_webhook(
        pool: &PgPool,
        user_id: DbId,
        customer_id: &str,
        subscription_id: &str,
        price_id: &str,
        current_period_end: Option<Timestamp>,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions
                (user_id, customer_id, subscription_id, price_id, current_period_end)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_subscriptions_user
             DO UPDATE SET
                customer_id = EXCLUDED.customer_id,
                subscription_id = EXCLUDED.subscription_id,
                price_id = EXCLUDED.price_id,
                current_period_end = EXCLUDED.current_period_end,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .bind(customer_id)
            .bind(subscription_id)
            .bind(price_id)
            .bind(current_period_end)
            .fetch_one(pool)
            .await
    }
}

//! Payment-provider subscription state, one row per account.

use serde::Serialize;
use sqlx::FromRow;

use servia_core::types::{DbId, Timestamp};

/// A row from the `subscriptions` table.
///
/// `customer_id` is set as soon as the provider knows the account;
/// `subscription_id` / `price_id` / `current_period_end` stay NULL until a
/// webhook reports an active subscription. "Has an active subscription"
/// means `subscription_id` is present and non-empty.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    pub customer_id: String,
    pub subscription_id: Option<String>,
    pub price_id: Option<String>,
    pub current_period_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Whether this row represents an active subscription.
    pub fn is_active(&self) -> bool {
        self.subscription_id
            .as_deref()
            .is_some_and(|s| !s.is_empty())
    }
}

/// Subscription summary returned by status/profile endpoints.
#[derive(Debug, Serialize)]
pub struct SubscriptionStatus {
    pub has_subscription: bool,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
    pub price_id: Option<String>,
    pub current_period_end: Option<Timestamp>,
}

impl SubscriptionStatus {
    /// Build the status projection from an optional row.
    pub fn from_row(row: Option<&Subscription>) -> Self {
        SubscriptionStatus {
            has_subscription: row.is_some_and(Subscription::is_active),
            customer_id: row.map(|s| s.customer_id.clone()),
            subscription_id: row.and_then(|s| s.subscription_id.clone()),
            price_id: row.and_then(|s| s.price_id.clone()),
            current_period_end: row.and_then(|s| s.current_period_end),
        }
    }
}

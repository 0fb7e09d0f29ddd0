//! HTTP client for the recurring-billing provider.
//!
//! Covers the four calls the subscription flow needs: customer creation,
//! checkout-session creation, billing-portal session creation, and
//! subscription retrieval. The provider speaks a Stripe-style API:
//! form-encoded POSTs, bearer secret key, JSON responses.

use std::time::Duration;

use serde::Deserialize;

use servia_core::types::{DbId, Timestamp};

use crate::config::PaymentConfig;

use super::GatewayError;

/// HTTP request timeout for a single provider call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A customer object returned by the provider.
#[derive(Debug, Deserialize)]
pub struct Customer {
    pub id: String,
}

/// A hosted session (checkout or billing portal) with a redirect URL.
#[derive(Debug, Deserialize)]
pub struct HostedSession {
    pub url: String,
}

/// A subscription object returned by the provider.
#[derive(Debug, Deserialize)]
pub struct ProviderSubscription {
    pub id: String,
    pub customer: String,
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub items: SubscriptionItems,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionItem {
    pub price: Price,
}

#[derive(Debug, Deserialize)]
pub struct Price {
    pub id: String,
}

impl ProviderSubscription {
    /// The price id of the first subscription item, if any.
    pub fn price_id(&self) -> Option<&str> {
        self.items.data.first().map(|item| item.price.id.as_str())
    }

    /// Period end as a UTC timestamp.
    pub fn period_end(&self) -> Option<Timestamp> {
        self.current_period_end
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
    }

    /// The `user_id` metadata value set at checkout, if present and numeric.
    pub fn user_id_metadata(&self) -> Option<DbId> {
        self.metadata
            .get("user_id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }
}

/// Client for the billing provider's REST API.
pub struct BillingClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl BillingClient {
    /// Create a client from the payment configuration.
    pub fn new(config: &PaymentConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            http,
            base_url: config.billing_base_url.clone(),
            secret_key: config.billing_secret_key.clone(),
        }
    }

    /// Create a provider customer for an account.
    pub async fn create_customer(
        &self,
        email: &str,
        name: &str,
        user_id: DbId,
    ) -> Result<Customer, GatewayError> {
        let user_id = user_id.to_string();
        let params = [
            ("email", email),
            ("name", name),
            ("metadata[user_id]", user_id.as_str()),
        ];
        self.post_form("/customers", &params).await
    }

    /// Create a subscription checkout session for a customer.
    pub async fn create_checkout_session(
        &self,
        customer_id: &str,
        user_id: DbId,
        config: &PaymentConfig,
    ) -> Result<HostedSession, GatewayError> {
        let amount = config.plan_amount.to_string();
        let user_id = user_id.to_string();
        let params = [
            ("mode", "subscription"),
            ("customer", customer_id),
            ("success_url", config.account_url.as_str()),
            ("cancel_url", config.account_url.as_str()),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", "brl"),
            ("line_items[0][price_data][unit_amount]", amount.as_str()),
            (
                "line_items[0][price_data][recurring][interval]",
                "month",
            ),
            (
                "line_items[0][price_data][product_data][name]",
                config.plan_name.as_str(),
            ),
            ("metadata[user_id]", user_id.as_str()),
        ];
        self.post_form("/checkout/sessions", &params).await
    }

    /// Create a billing-portal session for an existing subscriber.
    pub async fn create_portal_session(
        &self,
        customer_id: &str,
        config: &PaymentConfig,
    ) -> Result<HostedSession, GatewayError> {
        let params = [
            ("customer", customer_id),
            ("return_url", config.account_url.as_str()),
        ];
        self.post_form("/billing_portal/sessions", &params).await
    }

    /// Retrieve a subscription by id.
    pub async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, GatewayError> {
        let url = format!("{}/subscriptions/{subscription_id}", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// POST a form-encoded request and deserialize the JSON response.
    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(params)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Check status and deserialize, capturing the body of failures for logs.
    async fn parse<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

//! HTTP client for the instant-payment (credit top-up) provider.
//!
//! Creates orders carrying a QR-code charge. The provider confirms payment
//! asynchronously through the signature-verified webhook handled in
//! `handlers::payments`.

use std::time::Duration;

use serde::Serialize;
use serde_json::json;

use crate::config::PaymentConfig;

use super::GatewayError;

/// HTTP request timeout for a single provider call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Order creation input assembled by the payments handler.
#[derive(Debug, Serialize)]
pub struct CreateOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_tax_id: Option<String>,
    pub product: String,
    pub quantity: i32,
    /// Unit price in the provider's minor currency unit.
    pub unit_amount: i64,
}

/// The QR charge returned to the client for payment.
#[derive(Debug, Serialize)]
pub struct OrderQr {
    pub reference_id: String,
    pub qr_text: String,
    pub qr_link: String,
}

/// Client for the orders provider's REST API.
pub struct OrdersClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    notification_url: Option<String>,
}

impl OrdersClient {
    /// Create a client from the payment configuration.
    pub fn new(config: &PaymentConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            http,
            base_url: config.orders_base_url.clone(),
            token: config.orders_token.clone(),
            notification_url: config.orders_notification_url.clone(),
        }
    }

    /// Create an order with a QR charge for the full amount.
    pub async fn create_order(&self, input: &CreateOrder) -> Result<OrderQr, GatewayError> {
        let reference_id = format!("order-{}", uuid::Uuid::new_v4());
        let total = input.unit_amount * input.quantity as i64;

        let notification_urls: Vec<&str> = self
            .notification_url
            .as_deref()
            .into_iter()
            .collect();

        let payload = json!({
            "reference_id": reference_id,
            "customer": {
                "name": input.customer_name,
                "email": input.customer_email,
                "tax_id": input.customer_tax_id,
            },
            "items": [{
                "name": input.product,
                "quantity": input.quantity,
                "unit_amount": input.unit_amount,
            }],
            "qr_codes": [{
                "amount": { "value": total },
            }],
            "notification_urls": notification_urls,
        });

        let url = format!("{}/orders", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        let qr = body
            .get("qr_codes")
            .and_then(|codes| codes.get(0))
            .ok_or_else(|| GatewayError::Malformed("missing qr_codes[0]".into()))?;

        let qr_text = qr
            .get("text")
            .and_then(|t| t.as_str())
            .ok_or_else(|| GatewayError::Malformed("missing qr_codes[0].text".into()))?
            .to_string();

        let qr_link = qr
            .get("links")
            .and_then(|links| links.get(0))
            .and_then(|link| link.get("href"))
            .and_then(|href| href.as_str())
            .ok_or_else(|| GatewayError::Malformed("missing qr_codes[0].links[0].href".into()))?
            .to_string();

        Ok(OrderQr {
            reference_id,
            qr_text,
            qr_link,
        })
    }
}

//! Handlers for the `/payments` resource: subscription checkout, status,
//! credit top-up orders, and the inbound provider webhooks.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use servia_core::error::CoreError;
use servia_core::types::DbId;
use servia_db::models::subscription::SubscriptionStatus;
use servia_db::repositories::{SubscriptionRepo, UserRepo};
use servia_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::gateway::orders::CreateOrder;
use crate::gateway::signature::verify_signature;
use crate::middleware::rbac::{RequireAuth, RequireProfessional};
use crate::response::DataResponse;
use crate::state::AppState;

/// Header carrying the webhook signature on both providers.
const SIGNATURE_HEADER: &str = "x-webhook-signature";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /payments/orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub product: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Unit price in the provider's minor currency unit.
    pub unit_amount: i64,
    pub tax_id: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

/// Billing provider webhook envelope.
#[derive(Debug, Deserialize)]
struct BillingEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: BillingEventData,
}

#[derive(Debug, Deserialize)]
struct BillingEventData {
    object: BillingEventObject,
}

#[derive(Debug, Deserialize)]
struct BillingEventObject {
    #[serde(default)]
    customer: Option<String>,
    #[serde(default)]
    subscription: Option<String>,
    #[serde(default)]
    metadata: serde_json::Value,
}

/// Orders provider webhook payload.
#[derive(Debug, Deserialize)]
struct OrderEvent {
    event: String,
    #[serde(default)]
    user_id: Option<DbId>,
    /// Credits purchased, credited 1:1 after confirmation.
    #[serde(default)]
    amount: Option<i32>,
}

// ---------------------------------------------------------------------------
// Billing (subscription) endpoints
// ---------------------------------------------------------------------------

/// POST /api/v1/payments/billing/checkout
///
/// Professionals only. Returns a hosted provider URL: the billing portal
/// for accounts that already hold an active subscription, otherwise a
/// subscription checkout session (creating the provider customer first when
/// needed).
pub async fn billing_checkout(
    RequireProfessional(professional): RequireProfessional,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, professional.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: professional.user_id,
        }))?;

    let subscription = SubscriptionRepo::find_by_user(&state.pool, user.id).await?;

    if let Some(sub) = subscription.as_ref().filter(|s| s.is_active()) {
        let session = state
            .billing
            .create_portal_session(&sub.customer_id, &state.config.payments)
            .await
            .map_err(|e| AppError::Upstream(format!("portal session: {e}")))?;
        return Ok(Json(json!({ "url": session.url })));
    }

    let customer_id = match subscription {
        Some(sub) => sub.customer_id,
        None => {
            let customer = state
                .billing
                .create_customer(&user.email, &user.user_name, user.id)
                .await
                .map_err(|e| AppError::Upstream(format!("customer creation: {e}")))?;
            SubscriptionRepo::upsert_customer(&state.pool, user.id, &customer.id).await?;
            customer.id
        }
    };

    let session = state
        .billing
        .create_checkout_session(&customer_id, user.id, &state.config.payments)
        .await
        .map_err(|e| AppError::Upstream(format!("checkout session: {e}")))?;

    Ok(Json(json!({ "url": session.url })))
}

/// GET /api/v1/payments/billing/status
///
/// The caller's subscription summary.
pub async fn billing_status(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let subscription = SubscriptionRepo::find_by_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: SubscriptionStatus::from_row(subscription.as_ref()),
    }))
}

/// POST /api/v1/payments/billing/webhook
///
/// Signature-verified provider callback. Payment-confirming events refresh
/// the stored subscription snapshot; everything else is acknowledged and
/// ignored.
pub async fn billing_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    check_signature(
        &headers,
        &body,
        &state.config.payments.billing_webhook_secret,
    )?;

    let event: BillingEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    match event.event_type.as_str() {
        "checkout.session.completed" | "invoice.payment_succeeded" => {
            apply_subscription_update(&state, &event.data.object).await?;
        }
        other => {
            tracing::info!(event_type = other, "Ignoring billing webhook event");
        }
    }

    Ok(Json(json!({ "received": true })))
}

/// Retrieve the subscription named by a webhook event and upsert its
/// snapshot, resolving the owning user from metadata or the stored customer
/// id.
async fn apply_subscription_update(
    state: &AppState,
    object: &BillingEventObject,
) -> AppResult<()> {
    let (Some(subscription_id), Some(customer_id)) =
        (object.subscription.as_deref(), object.customer.as_deref())
    else {
        tracing::warn!("Billing webhook without subscription or customer id");
        return Ok(());
    };

    let provider_sub = state
        .billing
        .get_subscription(subscription_id)
        .await
        .map_err(|e| AppError::Upstream(format!("subscription retrieval: {e}")))?;

    let metadata_user_id = object
        .metadata
        .get("user_id")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<DbId>().ok())
        .or_else(|| provider_sub.user_id_metadata());

    let user_id = match metadata_user_id {
        Some(id) => id,
        None => {
            match SubscriptionRepo::find_by_customer(&state.pool, customer_id).await? {
                Some(record) => record.user_id,
                None => {
                    tracing::warn!(
                        subscription_id,
                        customer_id,
                        "Billing webhook user could not be resolved"
                    );
                    return Ok(());
                }
            }
        }
    };

    SubscriptionRepo::upsert_from_webhook(
        &state.pool,
        user_id,
        customer_id,
        &provider_sub.id,
        provider_sub.price_id().unwrap_or_default(),
        provider_sub.period_end(),
    )
    .await?;

    tracing::info!(user_id, subscription_id, "Subscription updated from webhook");

    if let Some(user) = UserRepo::find_by_id(&state.pool, user_id).await? {
        state.event_bus.publish(
            PlatformEvent::new("subscription.updated")
                .with_actor(user_id)
                .with_email(user.email)
                .with_payload(json!({ "subscription_id": provider_sub.id })),
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Credit top-up (order) endpoints
// ---------------------------------------------------------------------------

/// POST /api/v1/payments/orders
///
/// Create a QR-code charge for a credit top-up. The provider confirms the
/// payment asynchronously through the orders webhook.
pub async fn create_order(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateOrderRequest>,
) -> AppResult<impl IntoResponse> {
    if input.quantity < 1 {
        return Err(AppError::Core(CoreError::Validation(
            "quantity must be >= 1".into(),
        )));
    }
    if input.unit_amount < 1 {
        return Err(AppError::Core(CoreError::Validation(
            "unit_amount must be >= 1".into(),
        )));
    }

    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    let order = CreateOrder {
        customer_name: user.user_name,
        customer_email: user.email,
        customer_tax_id: input.tax_id,
        product: input.product,
        quantity: input.quantity,
        unit_amount: input.unit_amount,
    };

    let qr = state
        .orders
        .create_order(&order)
        .await
        .map_err(|e| AppError::Upstream(format!("order creation: {e}")))?;

    tracing::info!(
        user_id = auth.user_id,
        reference_id = %qr.reference_id,
        "Credit top-up order created"
    );

    Ok(Json(DataResponse { data: qr }))
}

/// POST /api/v1/payments/orders/webhook
///
/// Signature-verified payment confirmation. Credits the account and pushes
/// a `payment.updated` event to the payer's WebSocket group. A missing
/// account is logged and acknowledged, never retried.
pub async fn orders_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    check_signature(
        &headers,
        &body,
        &state.config.payments.orders_webhook_secret,
    )?;

    let event: OrderEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    if event.event != "order.paid" {
        tracing::info!(event = %event.event, "Ignoring orders webhook event");
        return Ok(Json(json!({ "received": true })));
    }

    let (Some(user_id), Some(amount)) = (event.user_id, event.amount) else {
        tracing::warn!("Paid-order webhook without user_id or amount");
        return Ok(Json(json!({ "received": true })));
    };

    if amount <= 0 {
        tracing::warn!(user_id, amount, "Paid-order webhook with non-positive amount");
        return Ok(Json(json!({ "received": true })));
    }

    match UserRepo::add_credits(&state.pool, user_id, amount).await? {
        Some(user) => {
            tracing::info!(user_id, amount, balance = user.credits, "Credits added");
            state.event_bus.publish(
                PlatformEvent::new("payment.updated")
                    .with_actor(user_id)
                    .with_email(user.email)
                    .with_payload(json!({ "credits": user.credits })),
            );
        }
        None => {
            tracing::warn!(user_id, "Paid-order webhook for unknown account, ignoring");
        }
    }

    Ok(Json(json!({ "received": true })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify the webhook signature header against the raw body.
fn check_signature(headers: &HeaderMap, body: &[u8], secret: &str) -> AppResult<()> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing webhook signature".into()))?;

    verify_signature(header, body, secret, chrono::Utc::now().timestamp())
        .map_err(|e| AppError::BadRequest(format!("Webhook signature rejected: {e}")))
}

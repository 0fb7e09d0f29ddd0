//! Route definitions for the `/payments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// POST /billing/checkout  -> billing_checkout (professional)
/// GET  /billing/status    -> billing_status (requires auth)
/// POST /billing/webhook   -> billing_webhook (signature-verified)
/// POST /orders            -> create_order (requires auth)
/// POST /orders/webhook    -> orders_webhook (signature-verified)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/billing/checkout", post(payments::billing_checkout))
        .route("/billing/status", get(payments::billing_status))
        .route("/billing/webhook", post(payments::billing_webhook))
        .route("/orders", post(payments::create_order))
        .route("/orders/webhook", post(payments::orders_webhook))
}

pub mod areas;
pub mod auth;
pub mod health;
pub mod payments;
pub mod services;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                   WebSocket (payment notifications)
///
/// /auth/register                        register (public)
/// /auth/login                           login (public)
/// /auth/confirm-email                   confirm email (public)
/// /auth/resend-confirmation             resend code (public)
/// /auth/me                              profile (requires auth)
///
/// /users                                list (requires auth)
/// /users/{id}                           get, update (self), delete (self)
///
/// /areas                                list (public), create (requires auth)
/// /areas/{id}                           get (public)
///
/// /services                             create (client)
/// /services/mine                        own requests (client)
/// /services/search                      open-pool search (professional)
/// /services/{id}                        detail (professional), update, delete (owner)
/// /services/{id}/unlock                 standard unlock (professional)
/// /services/{id}/exclusive              exclusive unlock (professional)
///
/// /payments/billing/checkout            hosted checkout/portal URL (professional)
/// /payments/billing/status              subscription summary (requires auth)
/// /payments/billing/webhook             provider callback (signature-verified)
/// /payments/orders                      credit top-up QR order (requires auth)
/// /payments/orders/webhook              provider callback (signature-verified)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::handler::ws_handler))
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/areas", areas::router())
        .nest("/services", services::router())
        .nest("/payments", payments::router())
}

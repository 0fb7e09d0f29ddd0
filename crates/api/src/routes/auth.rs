//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register             -> register
/// POST /login                -> login
/// POST /confirm-email        -> confirm_email
/// POST /resend-confirmation  -> resend_confirmation
/// GET  /me                   -> me (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/confirm-email", post(auth::confirm_email))
        .route("/resend-confirmation", post(auth::resend_confirmation))
        .route("/me", get(auth::me))
}

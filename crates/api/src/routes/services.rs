//! Route definitions for the `/services` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::services;
use crate::state::AppState;

/// Routes mounted at `/services`.
///
/// ```text
/// POST /                 -> create_service (client)
/// GET  /mine             -> list_own_services (client)
/// GET  /search           -> search_services (professional)
/// GET  /{id}             -> get_service (professional)
/// PUT  /{id}             -> update_service (owner)
/// DELETE /{id}           -> delete_service (owner)
/// POST /{id}/unlock      -> unlock_service (professional)
/// POST /{id}/exclusive   -> unlock_service_exclusive (professional)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(services::create_service))
        .route("/mine", get(services::list_own_services))
        .route("/search", get(services::search_services))
        .route(
            "/{id}",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
        .route("/{id}/unlock", post(services::unlock_service))
        .route("/{id}/exclusive", post(services::unlock_service_exclusive))
}

//! Route definitions for the `/areas` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::areas;
use crate::state::AppState;

/// Routes mounted at `/areas`.
///
/// ```text
/// GET  /       -> list_areas
/// POST /       -> create_area (requires auth)
/// GET  /{id}   -> get_area
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(areas::list_areas).post(areas::create_area))
        .route("/{id}", get(areas::get_area))
}

//! Handlers for the `/areas` reference resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use servia_core::error::CoreError;
use servia_core::types::DbId;
use servia_db::models::professional_area::CreateProfessionalArea;
use servia_db::repositories::ProfessionalAreaRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/areas
///
/// List all specialty areas alphabetically. Public: registration needs the
/// list before any account exists.
pub async fn list_areas(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let areas = ProfessionalAreaRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: areas }))
}

/// GET /api/v1/areas/{id}
pub async fn get_area(
    State(state): State<AppState>,
    Path(area_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let area = ProfessionalAreaRepo::find_by_id(&state.pool, area_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProfessionalArea",
            id: area_id,
        }))?;
    Ok(Json(DataResponse { data: area }))
}

/// POST /api/v1/areas
///
/// Create a new specialty area. Duplicate names surface as 409.
pub async fn create_area(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateProfessionalArea>,
) -> AppResult<impl IntoResponse> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }

    let area = ProfessionalAreaRepo::create(&state.pool, name).await?;
    tracing::info!(area_id = area.id, name = %area.name, "Professional area created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: area })))
}

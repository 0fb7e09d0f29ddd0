//! Handlers for the `/services` resource: client-side CRUD plus the
//! professional-side discovery and unlock surface backed by the settlement
//! engine.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use servia_core::error::CoreError;
use servia_core::types::DbId;
use servia_core::unlock::effective_value;
use servia_db::models::service_request::{CreateServiceRequest, UpdateServiceRequest};
use servia_db::repositories::ServiceRequestRepo;

use crate::engine::settlement;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireClient, RequireProfessional};
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/services
///
/// Create a service request owned by the calling client. Absent or
/// non-positive values settle at the default unlock cost.
pub async fn create_service(
    RequireClient(client): RequireClient,
    State(state): State<AppState>,
    Json(input): Json<CreateServiceRequest>,
) -> AppResult<impl IntoResponse> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "title must not be empty".into(),
        )));
    }

    let value = effective_value(input.value.unwrap_or(0));
    let service = ServiceRequestRepo::create(&state.pool, client.user_id, &input, value).await?;

    tracing::info!(
        service_id = service.id,
        client_id = client.user_id,
        "Service request created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: service })))
}

/// GET /api/v1/services/mine
///
/// The calling client's own requests, newest first.
pub async fn list_own_services(
    RequireClient(client): RequireClient,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let services = ServiceRequestRepo::list_by_client(&state.pool, client.user_id).await?;
    Ok(Json(DataResponse { data: services }))
}

/// GET /api/v1/services/search
///
/// Discovery listing for professionals: open requests from the last month,
/// category-filtered, excluding requests the caller owns or has already
/// unlocked. Contact fields are never included here.
pub async fn search_services(
    RequireProfessional(professional): RequireProfessional,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let page = settlement::search_open_requests(&state.pool, professional.user_id, &params).await?;
    Ok(Json(page))
}

/// GET /api/v1/services/{id}
///
/// Professional detail view. Contact fields are present iff the caller has
/// already unlocked this request.
pub async fn get_service(
    RequireProfessional(professional): RequireProfessional,
    State(state): State<AppState>,
    Path(service_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail =
        settlement::get_service_detail(&state.pool, professional.user_id, service_id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/services/{id}/unlock
///
/// Settle a standard unlock (subscription-covered or credit-paid) and
/// reveal the client's contact details.
pub async fn unlock_service(
    RequireProfessional(professional): RequireProfessional,
    State(state): State<AppState>,
    Path(service_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail =
        settlement::unlock_service(&state.pool, professional.user_id, service_id).await?;

    tracing::info!(
        service_id,
        professional_id = professional.user_id,
        "Service unlocked"
    );

    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/services/{id}/exclusive
///
/// Settle an exclusive unlock: credit-paid regardless of subscription, only
/// available while nobody else has unlocked, closes the request.
pub async fn unlock_service_exclusive(
    RequireProfessional(professional): RequireProfessional,
    State(state): State<AppState>,
    Path(service_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail =
        settlement::unlock_service_exclusive(&state.pool, professional.user_id, service_id)
            .await?;

    tracing::info!(
        service_id,
        professional_id = professional.user_id,
        "Service unlocked exclusively"
    );

    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/services/{id}
///
/// Update caller-editable fields. Only the owning client may update.
pub async fn update_service(
    RequireClient(client): RequireClient,
    State(state): State<AppState>,
    Path(service_id): Path<DbId>,
    Json(input): Json<UpdateServiceRequest>,
) -> AppResult<impl IntoResponse> {
    require_owner(&state, service_id, client.user_id).await?;

    let updated = ServiceRequestRepo::update(&state.pool, service_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Service",
            id: service_id,
        }))?;

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/services/{id}
///
/// Delete a request. Unlock rows cascade. Only the owning client may delete.
pub async fn delete_service(
    RequireClient(client): RequireClient,
    State(state): State<AppState>,
    Path(service_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_owner(&state, service_id, client.user_id).await?;

    ServiceRequestRepo::delete(&state.pool, service_id).await?;
    tracing::info!(service_id, client_id = client.user_id, "Service request deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Fail with 404 when the service is missing, 403 when not owned by the
/// caller.
async fn require_owner(state: &AppState, service_id: DbId, client_id: DbId) -> AppResult<()> {
    let service = ServiceRequestRepo::find_by_id(&state.pool, service_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Service",
            id: service_id,
        }))?;

    if service.client_id != client_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not the owner of this service request".into(),
        )));
    }
    Ok(())
}

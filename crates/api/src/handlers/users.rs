//! Handlers for the `/users` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use servia_core::error::CoreError;
use servia_core::types::DbId;
use servia_db::models::user::{UpdateProfile, UserSummary};
use servia_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users
///
/// List all accounts as public summaries.
pub async fn list_users(
    _auth: RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let users = UserRepo::list(&state.pool).await?;
    let summaries: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();
    Ok(Json(DataResponse { data: summaries }))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    Ok(Json(DataResponse {
        data: UserSummary::from(&user),
    }))
}

/// PUT /api/v1/users/{id}
///
/// Update profile fields. Accounts can only modify themselves.
pub async fn update_user(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<UpdateProfile>,
) -> AppResult<impl IntoResponse> {
    if auth.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cannot modify another user's profile".into(),
        )));
    }

    let updated = UserRepo::update_profile(&state.pool, user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    Ok(Json(DataResponse {
        data: UserSummary::from(&updated),
    }))
}

/// DELETE /api/v1/users/{id}
///
/// Delete the account. Unlocks, area links, and the subscription row
/// cascade. Accounts can only delete themselves.
pub async fn delete_user(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if auth.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cannot delete another user's account".into(),
        )));
    }

    let deleted = UserRepo::delete(&state.pool, user_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }

    tracing::info!(user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not meet the requirement. Use these in route handlers to enforce
//! authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use servia_core::error::CoreError;
use servia_core::roles::{ROLE_CLIENT, ROLE_PROFESSIONAL};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `professional` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn professionals_only(RequireProfessional(user): RequireProfessional) -> AppResult<Json<()>> {
///     // user is guaranteed to be a professional here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireProfessional(pub AuthUser);

impl FromRequestParts<AppState> for RequireProfessional {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_PROFESSIONAL {
            return Err(AppError::Core(CoreError::Forbidden(
                "Professional role required".into(),
            )));
        }
        Ok(RequireProfessional(user))
    }
}

/// Requires the `client` role. Rejects with 403 Forbidden otherwise.
pub struct RequireClient(pub AuthUser);

impl FromRequestParts<AppState> for RequireClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_CLIENT {
            return Err(AppError::Core(CoreError::Forbidden(
                "Client role required".into(),
            )));
        }
        Ok(RequireClient(user))
    }
}

/// Requires any authenticated user (any valid role).
///
/// Functionally equivalent to [`AuthUser`] but named explicitly for use in
/// route definitions where the intent "this route requires authentication"
/// should be self-documenting.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}

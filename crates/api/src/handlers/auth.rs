//! Handlers for the `/auth` resource (registration, login, email
//! confirmation, profile).

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use servia_core::confirmation::{self, ConfirmOutcome, CODE_TTL_MINUTES};
use servia_core::error::CoreError;
use servia_core::roles::UserRole;
use servia_core::types::DbId;
use servia_db::models::subscription::SubscriptionStatus;
use servia_db::models::user::{CreateUser, User, UserSummary};
use servia_db::repositories::{
    ProfessionalAreaRepo, ServiceRequestRepo, SubscriptionRepo, UserRepo,
};
use servia_events::PlatformEvent;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
    /// Numeric role code: 1 = client, 2 = professional.
    pub user_type: i32,
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub complement: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub phone: String,
    /// Specialty areas; required (non-empty) for professionals.
    #[serde(default)]
    pub professional_area_ids: Vec<DbId>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/confirm-email`.
#[derive(Debug, Deserialize)]
pub struct ConfirmEmailRequest {
    pub email: String,
    pub code: String,
}

/// Request body for `POST /auth/resend-confirmation`.
#[derive(Debug, Deserialize)]
pub struct ResendConfirmationRequest {
    pub email: String,
}

/// Successful authentication response returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Response for the confirmation endpoints.
#[derive(Debug, Serialize)]
pub struct ConfirmationResponse {
    pub confirmed: bool,
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account in the unconfirmed state, link professional areas, and
/// send the confirmation code. The user and its area links are inserted in
/// one transaction; the email send is fire-and-forget.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let role = UserRole::from_registration_code(input.user_type).ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "Invalid user_type. Use 1 for client, 2 for professional.".into(),
        ))
    })?;

    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Email is already registered".into(),
        )));
    }

    // Professionals must declare at least one specialty area, and every
    // referenced area must exist.
    let mut area_ids = input.professional_area_ids.clone();
    area_ids.sort_unstable();
    area_ids.dedup();

    if role == UserRole::Professional && area_ids.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Professionals must select at least one professional area".into(),
        )));
    }
    for area_id in &area_ids {
        if ProfessionalAreaRepo::find_by_id(&state.pool, *area_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Professional area does not exist: {area_id}"
            ))));
        }
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let code = confirmation::generate_code();
    let create = CreateUser {
        user_name: input.user_name,
        email: input.email,
        password_hash,
        role: role.as_str().to_string(),
        profile_image_url: input.profile_image_url,
        street: input.street,
        number: input.number,
        complement: input.complement,
        zip_code: input.zip_code,
        city: input.city,
        state: input.state,
        phone: input.phone,
        email_confirmation_code: code.clone(),
        email_confirmation_expires_at: confirmation::expiry_from(Utc::now()),
    };

    let user = UserRepo::create_with_areas(&state.pool, &create, &area_ids).await?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");

    send_confirmation_email(&state, &user, code);

    state.event_bus.publish(
        PlatformEvent::new("user.registered")
            .with_actor(user.id)
            .with_email(user.email.clone()),
    );

    let token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(AuthResponse {
        token,
        user: UserSummary::from(&user),
    }))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Unconfirmed accounts are rejected
/// until they complete email confirmation.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    if !user.email_confirmed {
        return Err(AppError::EmailNotConfirmed);
    }

    let token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(AuthResponse {
        token,
        user: UserSummary::from(&user),
    }))
}

/// POST /api/v1/auth/confirm-email
///
/// Confirm an account with the emailed code. Confirming twice is an
/// idempotent success.
pub async fn confirm_email(
    State(state): State<AppState>,
    Json(input): Json<ConfirmEmailRequest>,
) -> AppResult<Json<ConfirmationResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or(AppError::InvalidOrExpiredCode)?;

    let outcome = confirmation::confirm(
        user.email_confirmed,
        user.email_confirmation_code.as_deref(),
        user.email_confirmation_expires_at,
        input.code.trim(),
        Utc::now(),
    );

    match outcome {
        ConfirmOutcome::AlreadyConfirmed => Ok(Json(ConfirmationResponse {
            confirmed: true,
            message: "Email already confirmed",
        })),
        ConfirmOutcome::Confirmed => {
            UserRepo::confirm_email(&state.pool, user.id).await?;
            tracing::info!(user_id = user.id, "Email confirmed");
            Ok(Json(ConfirmationResponse {
                confirmed: true,
                message: "Email confirmed",
            }))
        }
        ConfirmOutcome::InvalidOrExpired => Err(AppError::InvalidOrExpiredCode),
    }
}

/// POST /api/v1/auth/resend-confirmation
///
/// Rotate the confirmation code and re-send it. No-op for accounts that are
/// already confirmed.
pub async fn resend_confirmation(
    State(state): State<AppState>,
    Json(input): Json<ResendConfirmationRequest>,
) -> AppResult<Json<ConfirmationResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("No account registered with this email".into())
        })?;

    if user.email_confirmed {
        return Ok(Json(ConfirmationResponse {
            confirmed: true,
            message: "Email already confirmed",
        }));
    }

    let code = confirmation::generate_code();
    UserRepo::rotate_confirmation_code(
        &state.pool,
        user.id,
        &code,
        confirmation::expiry_from(Utc::now()),
    )
    .await?;

    send_confirmation_email(&state, &user, code);

    Ok(Json(ConfirmationResponse {
        confirmed: false,
        message: "Confirmation code sent",
    }))
}

/// GET /api/v1/auth/me
///
/// The authenticated user's profile, subscription summary, owned requests,
/// unlocked requests, and professional areas. Sensitive columns never leave
/// the server.
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<serde_json::Value>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    let subscription = SubscriptionRepo::find_by_user(&state.pool, user.id).await?;
    let client_services = ServiceRequestRepo::list_by_client(&state.pool, user.id).await?;
    let unlocked_services =
        ServiceRequestRepo::list_unlocked_by_professional(&state.pool, user.id).await?;
    let areas = ProfessionalAreaRepo::list_for_user(&state.pool, user.id).await?;

    Ok(Json(serde_json::json!({
        "user_name": user.user_name,
        "email": user.email,
        "role": user.role,
        "profile_image_url": user.profile_image_url,
        "phone": user.phone,
        "credits": user.credits,
        "email_confirmed": user.email_confirmed,
        "subscription": SubscriptionStatus::from_row(subscription.as_ref()),
        "client_services": client_services,
        "unlocked_services": unlocked_services,
        "professional_areas": areas,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Send the confirmation code without blocking the request.
///
/// Delivery failure is logged and does not undo anything; the user can ask
/// for a resend.
fn send_confirmation_email(state: &AppState, user: &User, code: String) {
    let Some(mailer) = state.mailer.clone() else {
        tracing::warn!(
            user_id = user.id,
            "Email delivery not configured, skipping confirmation email"
        );
        return;
    };

    let to_email = user.email.clone();
    let user_name = user.user_name.clone();
    let user_id = user.id;

    tokio::spawn(async move {
        if let Err(e) = mailer
            .send_confirmation_code(&to_email, &user_name, &code, CODE_TTL_MINUTES)
            .await
        {
            tracing::error!(user_id, error = %e, "Failed to send confirmation email");
        }
    });
}

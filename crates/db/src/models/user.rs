//! Account entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use servia_core::types::{DbId, Timestamp};

/// A row from the `users` table.
///
/// `password_hash` and the confirmation code never leave the server; API
/// responses project into [`UserSummary`] / profile DTOs instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub profile_image_url: Option<String>,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub credits: i32,
    pub email_confirmed: bool,
    pub email_confirmation_code: Option<String>,
    pub email_confirmation_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for a new account.
#[derive(Debug)]
pub struct CreateUser {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub profile_image_url: Option<String>,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub email_confirmation_code: String,
    pub email_confirmation_expires_at: Timestamp,
}

/// Profile update payload (`PUT /users/{id}`). Absent fields keep their
/// current value.
#[derive(Debug, Deserialize)]
pub struct UpdateProfile {
    pub user_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
}

/// Public account projection embedded in auth responses.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: DbId,
    pub user_name: String,
    pub email: String,
    pub role: String,
    pub profile_image_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id,
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            profile_image_url: user.profile_image_url.clone(),
        }
    }
}

/// Client contact details revealed by a settled unlock.
#[derive(Debug, Clone, Serialize)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
}

//! Repository for the `users` table.

use sqlx::PgPool;

use servia_core::types::{DbId, Timestamp};

use crate::models::user::{CreateUser, UpdateProfile, User};

/// Column list for `users` queries.
const COLUMNS: &str = "\
    id, user_name, email, password_hash, role, profile_image_url, \
    street, number, complement, zip_code, city, state, phone, credits, \
    email_confirmed, email_confirmation_code, email_confirmation_expires_at, \
    created_at, updated_at";

/// Provides account CRUD, credit mutation, and confirmation-state updates.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new account together with its professional-area links.
    ///
    /// Runs in a transaction so a failed area insert never leaves a
    /// half-registered account behind.
    pub async fn create_with_areas(
        pool: &PgPool,
        input: &CreateUser,
        area_ids: &[DbId],
    ) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO users
                (user_name, email, password_hash, role, profile_image_url,
                 street, number, complement, zip_code, city, state, phone,
                 email_confirmation_code, email_confirmation_expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.user_name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(&input.profile_image_url)
            .bind(&input.street)
            .bind(&input.number)
            .bind(&input.complement)
            .bind(&input.zip_code)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.phone)
            .bind(&input.email_confirmation_code)
            .bind(input.email_confirmation_expires_at)
            .fetch_one(&mut *tx)
            .await?;

        for area_id in area_ids {
            sqlx::query(
                "INSERT INTO user_professional_areas (user_id, area_id)
                 VALUES ($1, $2)
                 ON CONFLICT ON CONSTRAINT uq_user_professional_areas_pair DO NOTHING",
            )
            .bind(user.id)
            .bind(area_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(user)
    }

    /// Find an account by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by email, case-insensitively.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List all accounts, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Update profile fields. Returns the updated row, or `None` if not found.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                user_name = COALESCE($1, user_name),
                profile_image_url = COALESCE($2, profile_image_url),
                street = COALESCE($3, street),
                number = COALESCE($4, number),
                complement = COALESCE($5, complement),
                zip_code = COALESCE($6, zip_code),
                city = COALESCE($7, city),
                state = COALESCE($8, state),
                phone = COALESCE($9, phone),
                updated_at = NOW()
             WHERE id = $10
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.user_name)
            .bind(&input.profile_image_url)
            .bind(&input.street)
            .bind(&input.number)
            .bind(&input.complement)
            .bind(&input.zip_code)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.phone)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an account. Unlocks, area links, and the subscription row
    /// cascade. Returns `false` if no row existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add credits to an account after a confirmed payment.
    ///
    /// Returns the updated row, or `None` when the account does not exist —
    /// the webhook caller logs and ignores that case.
    pub async fn add_credits(
        pool: &PgPool,
        id: DbId,
        amount: i32,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET credits = credits + $1, updated_at = NOW()
             WHERE id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(amount)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark an account confirmed and clear its confirmation code.
    pub async fn confirm_email(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                email_confirmed = TRUE,
                email_confirmation_code = NULL,
                email_confirmation_expires_at = NULL,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Issue a fresh confirmation code and expiry for an unconfirmed account.
    pub async fn rotate_confirmation_code(
        pool: &PgPool,
        id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                email_confirmation_code = $1,
                email_confirmation_expires_at = $2,
                updated_at = NOW()
             WHERE id = $3 AND email_confirmed = FALSE",
        )
        .bind(code)
        .bind(expires_at)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

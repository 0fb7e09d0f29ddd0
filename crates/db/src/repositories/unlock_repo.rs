//! Repository for the `unlocks` table.
//!
//! Reads only. The insert is part of the settlement engine's transaction in
//! the API crate, so that the unlock row, the occupancy increment, and the
//! credit debit commit or roll back together.

use sqlx::PgPool;

use servia_core::types::DbId;

use crate::models::unlock::Unlock;

/// Column list for `unlocks` queries.
const COLUMNS: &str = "id, professional_id, service_id, created_at";

/// Read access to settled unlocks.
pub struct UnlockRepo;

impl UnlockRepo {
    /// Find the unlock row for a (professional, service) pair, if any.
    pub async fn find_pair(
        pool: &PgPool,
        professional_id: DbId,
        service_id: DbId,
    ) -> Result<Option<Unlock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM unlocks
             WHERE professional_id = $1 AND service_id = $2"
        );
        sqlx::query_as::<_, Unlock>(&query)
            .bind(professional_id)
            .bind(service_id)
            .fetch_optional(pool)
            .await
    }

    /// List all unlocks held by a professional, newest first.
    pub async fn list_by_professional(
        pool: &PgPool,
        professional_id: DbId,
    ) -> Result<Vec<Unlock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM unlocks
             WHERE professional_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Unlock>(&query)
            .bind(professional_id)
            .fetch_all(pool)
            .await
    }

    /// Count distinct professionals holding an unlock on a request.
    pub async fn count_by_service(
        pool: &PgPool,
        service_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM unlocks WHERE service_id = $1")
            .bind(service_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}

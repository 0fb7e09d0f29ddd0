//! Repository for the `professional_areas` reference table.

use sqlx::PgPool;

use servia_core::types::DbId;

use crate::models::professional_area::ProfessionalArea;

/// Column list for `professional_areas` queries.
const COLUMNS: &str = "id, name, created_at";

/// Provides lookup and creation for specialty areas.
pub struct ProfessionalAreaRepo;

impl ProfessionalAreaRepo {
    /// Insert a new area. A duplicate name violates
    /// `uq_professional_areas_name` and surfaces as a conflict.
    pub async fn create(pool: &PgPool, name: &str) -> Result<ProfessionalArea, sqlx::Error> {
        let query = format!(
            "INSERT INTO professional_areas (name) VALUES ($1) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProfessionalArea>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Find an area by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProfessionalArea>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM professional_areas WHERE id = $1");
        sqlx::query_as::<_, ProfessionalArea>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all areas alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<ProfessionalArea>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM professional_areas ORDER BY name ASC");
        sqlx::query_as::<_, ProfessionalArea>(&query)
            .fetch_all(pool)
            .await
    }

    /// List the areas linked to a professional account.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ProfessionalArea>, sqlx::Error> {
        let query = format!(
            "SELECT a.id, a.name, a.created_at
             FROM professional_areas a
             JOIN user_professional_areas ua ON ua.area_id = a.id
             WHERE ua.user_id = $1
             ORDER BY a.name ASC"
        );
        sqlx::query_as::<_, ProfessionalArea>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}

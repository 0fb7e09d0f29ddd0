//! Repository for the `service_requests` table.

use sqlx::PgPool;

use servia_core::search::{Page, SEARCH_WINDOW_DAYS};
use servia_core::status::ServiceStatus;
use servia_core::types::DbId;

use crate::models::service_request::{
    CreateServiceRequest, ServiceRequest, UpdateServiceRequest,
};

/// Column list for `service_requests` queries.
const COLUMNS: &str = "\
    id, title, description, category, urgency, address, status, client_id, \
    value, professional_slots, created_at, updated_at";

/// Provides CRUD and open-pool search for service requests.
pub struct ServiceRequestRepo;

impl ServiceRequestRepo {
    /// Insert a new pending request, returning the created row.
    ///
    /// `value` must already be the effective cost (the handler applies the
    /// default for absent or non-positive input).
    pub async fn create(
        pool: &PgPool,
        client_id: DbId,
        input: &CreateServiceRequest,
        value: i32,
    ) -> Result<ServiceRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO service_requests
                (title, description, category, urgency, address, status, client_id, value)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.urgency)
            .bind(&input.address)
            .bind(ServiceStatus::Pending.as_str())
            .bind(client_id)
            .bind(value)
            .fetch_one(pool)
            .await
    }

    /// Find a request by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM service_requests WHERE id = $1");
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all requests owned by a client, newest first.
    pub async fn list_by_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<ServiceRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM service_requests
             WHERE client_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    /// List all requests a professional has unlocked, newest unlock first.
    pub async fn list_unlocked_by_professional(
        pool: &PgPool,
        professional_id: DbId,
    ) -> Result<Vec<ServiceRequest>, sqlx::Error> {
        let query = format!(
            "SELECT s.id, s.title, s.description, s.category, s.urgency, s.address,
                    s.status, s.client_id, s.value, s.professional_slots,
                    s.created_at, s.updated_at
             FROM service_requests s
             JOIN unlocks u ON u.service_id = s.id
             WHERE u.professional_id = $1
             ORDER BY u.created_at DESC"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(professional_id)
            .fetch_all(pool)
            .await
    }

    /// Update caller-editable fields. Returns the updated row, or `None` if
    /// not found.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateServiceRequest,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE service_requests SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                category = COALESCE($3, category),
                urgency = COALESCE($4, urgency),
                address = COALESCE($5, address),
                updated_at = NOW()
             WHERE id = $6
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.urgency)
            .bind(&input.address)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a request. Unlock rows cascade. Returns `false` if no row
    /// existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM service_requests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Search the open pool for a professional.
    ///
    /// Returns pending requests created within the search window, optionally
    /// restricted to a lowercase category set, excluding requests the caller
    /// owns or has already unlocked. Newest first.
    pub async fn search_open(
        pool: &PgPool,
        professional_id: DbId,
        categories: &[String],
        page: Page,
    ) -> Result<Vec<ServiceRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM service_requests
             WHERE status = $1
               AND created_at >= NOW() - make_interval(days => $2)
               AND (cardinality($3::text[]) = 0 OR LOWER(category) = ANY($3))
               AND client_id <> $4
               AND NOT EXISTS (
                   SELECT 1 FROM unlocks u
                   WHERE u.service_id = service_requests.id
                     AND u.professional_id = $4
               )
             ORDER BY created_at DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(ServiceStatus::Pending.as_str())
            .bind(SEARCH_WINDOW_DAYS as i32)
            .bind(categories)
            .bind(professional_id)
            .bind(page.page_size)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Total number of rows the matching [`search_open`](Self::search_open)
    /// filter would return, ignoring pagination.
    pub async fn count_open(
        pool: &PgPool,
        professional_id: DbId,
        categories: &[String],
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM service_requests
             WHERE status = $1
               AND created_at >= NOW() - make_interval(days => $2)
               AND (cardinality($3::text[]) = 0 OR LOWER(category) = ANY($3))
               AND client_id <> $4
               AND NOT EXISTS (
                   SELECT 1 FROM unlocks u
                   WHERE u.service_id = service_requests.id
                     AND u.professional_id = $4
               )",
        )
        .bind(ServiceStatus::Pending.as_str())
        .bind(SEARCH_WINDOW_DAYS as i32)
        .bind(categories)
        .bind(professional_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}

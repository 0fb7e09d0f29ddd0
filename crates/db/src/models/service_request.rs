//! Service request entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use servia_core::types::{DbId, Timestamp};

/// A row from the `service_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceRequest {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub urgency: String,
    pub address: String,
    pub status: String,
    pub client_id: DbId,
    /// Unlock cost in credits.
    pub value: i32,
    /// Number of distinct professionals holding an unlock on this request.
    pub professional_slots: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for `POST /services`.
#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub urgency: String,
    #[serde(default)]
    pub address: String,
    /// Unlock cost; non-positive or absent values are replaced with the
    /// default cost at creation.
    pub value: Option<i32>,
}

/// Update payload for `PUT /services/{id}`. Absent fields keep their
/// current value.
#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub address: Option<String>,
}

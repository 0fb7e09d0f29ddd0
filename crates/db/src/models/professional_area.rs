//! Professional specialty areas: a flat reference tag list linked to
//! professional accounts many-to-many.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use servia_core::types::{DbId, Timestamp};

/// A row from the `professional_areas` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfessionalArea {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

/// Insert payload for `POST /areas`.
#[derive(Debug, Deserialize)]
pub struct CreateProfessionalArea {
    pub name: String,
}

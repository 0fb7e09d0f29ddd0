//! Unlock join rows: a professional's purchased access to a service
//! request's contact details.

use serde::Serialize;
use sqlx::FromRow;

use servia_core::types::{DbId, Timestamp};

/// A row from the `unlocks` table.
///
/// Created exactly once per (professional, service) pair — enforced by the
/// `uq_unlocks_professional_service` constraint. Never updated; removed only
/// by cascading account or request deletion.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Unlock {
    pub id: DbId,
    pub professional_id: DbId,
    pub service_id: DbId,
    pub created_at: Timestamp,
}

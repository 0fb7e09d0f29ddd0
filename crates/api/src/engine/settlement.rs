//! The unlock/settlement engine.
//!
//! Each operation here owns its whole unit of work: entitlement is decided
//! up front from committed reads, and all three writes of a settlement (the
//! unlock row, the occupancy/status update, the credit debit) happen inside
//! one transaction that commits or rolls back together. The service row is
//! taken `FOR UPDATE` so concurrent unlocks of the same request serialize on
//! the occupancy counter, and the unique constraint on
//! (professional_id, service_id) turns a duplicate-insert race into the
//! idempotent success path instead of a double charge.
//!
//! Dropping an un-committed `sqlx::Transaction` rolls it back, so a caller
//! that disconnects mid-settlement leaves no partial state behind.

use serde::Serialize;
use sqlx::PgPool;

use servia_core::error::CoreError;
use servia_core::search::{normalize_categories, Page};
use servia_core::status::ServiceStatus;
use servia_core::types::DbId;
use servia_core::unlock::{
    admit_professional, effective_value, Entitlement, UnlockDenied,
    MAX_PROFESSIONALS_PER_SERVICE,
};

use servia_db::models::service_request::ServiceRequest;
use servia_db::models::user::ContactInfo;
use servia_db::repositories::{ServiceRequestRepo, SubscriptionRepo, UnlockRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::query::SearchParams;
use crate::response::PageResponse;

/// A service request as seen by a professional: contact details are present
/// only once the professional holds an unlock.
#[derive(Debug, Serialize)]
pub struct ServiceDetail {
    #[serde(flatten)]
    pub service: ServiceRequest,
    pub contact: Option<ContactInfo>,
}

/// Read-only detail view.
///
/// Contact fields are revealed iff an unlock row already exists for this
/// (professional, service) pair. No mutation.
pub async fn get_service_detail(
    pool: &PgPool,
    professional_id: DbId,
    service_id: DbId,
) -> AppResult<ServiceDetail> {
    let service = require_service(pool, service_id).await?;
    let unlocked = UnlockRepo::find_pair(pool, professional_id, service_id)
        .await?
        .is_some();

    let contact = if unlocked {
        Some(client_contact(pool, &service).await?)
    } else {
        None
    };

    Ok(ServiceDetail { service, contact })
}

/// Settle a standard unlock: subscription-covered or credit-paid.
pub async fn unlock_service(
    pool: &PgPool,
    professional_id: DbId,
    service_id: DbId,
) -> AppResult<ServiceDetail> {
    let service = require_service(pool, service_id).await?;

    // Idempotence: a settled pair never re-charges and never re-increments.
    if UnlockRepo::find_pair(pool, professional_id, service_id)
        .await?
        .is_some()
    {
        return reveal(pool, service).await;
    }

    // A closed request (occupancy cap reached, or exclusively unlocked) left
    // the open pool; only professionals who already hold an unlock get in.
    if ServiceStatus::from_str(&service.status) != Some(ServiceStatus::Pending) {
        return Err(closed_error());
    }

    let cost = effective_value(service.value);
    let entitlement = load_entitlement(pool, professional_id, cost).await?;
    entitlement.check_standard()?;

    match commit_settlement(pool, professional_id, &service, cost, entitlement, false).await {
        Ok(()) => {}
        Err(SettlementError::AlreadyUnlocked) => {
            // A concurrent request for the same pair won the insert; that
            // settlement already paid, so this one just reveals.
        }
        Err(SettlementError::Closed) => return Err(closed_error()),
        Err(SettlementError::Denied(denied)) => return Err(denied.into()),
        Err(SettlementError::Database(e)) => {
            tracing::error!(
                professional_id,
                service_id,
                error = %e,
                "Unlock settlement failed, rolled back"
            );
            return Err(e.into());
        }
    }

    let service = require_service(pool, service_id).await?;
    reveal(pool, service).await
}

/// Settle an exclusive unlock: always credit-paid, closes the request.
pub async fn unlock_service_exclusive(
    pool: &PgPool,
    professional_id: DbId,
    service_id: DbId,
) -> AppResult<ServiceDetail> {
    let service = require_service(pool, service_id).await?;

    if UnlockRepo::find_pair(pool, professional_id, service_id)
        .await?
        .is_some()
    {
        return reveal(pool, service).await;
    }

    // Fast deny before paying for a transaction; re-asserted on the locked
    // row inside the commit.
    if service.professional_slots > 0 {
        return Err(UnlockDenied::ExclusivityUnavailable.into());
    }
    if ServiceStatus::from_str(&service.status) != Some(ServiceStatus::Pending) {
        return Err(closed_error());
    }

    let cost = effective_value(service.value);
    let entitlement = load_entitlement(pool, professional_id, cost).await?;
    entitlement.check_exclusive()?;

    match commit_settlement(pool, professional_id, &service, cost, entitlement, true).await {
        Ok(()) => {}
        Err(SettlementError::AlreadyUnlocked) => {}
        Err(SettlementError::Closed) => return Err(closed_error()),
        Err(SettlementError::Denied(denied)) => return Err(denied.into()),
        Err(SettlementError::Database(e)) => {
            tracing::error!(
                professional_id,
                service_id,
                error = %e,
                "Exclusive unlock settlement failed, rolled back"
            );
            return Err(e.into());
        }
    }

    let service = require_service(pool, service_id).await?;
    reveal(pool, service).await
}

/// Search the open pool for a professional.
///
/// Pending requests from the last month, optionally category-filtered,
/// excluding the caller's own and already-unlocked requests. Contact fields
/// are never part of listing results.
pub async fn search_open_requests(
    pool: &PgPool,
    professional_id: DbId,
    params: &SearchParams,
) -> AppResult<PageResponse<ServiceRequest>> {
    let page = Page::validate(params.page, params.page_size)?;
    let categories = normalize_categories(params.categories.as_deref());

    let total = ServiceRequestRepo::count_open(pool, professional_id, &categories).await?;
    let items = ServiceRequestRepo::search_open(pool, professional_id, &categories, page).await?;

    Ok(PageResponse {
        page: page.page,
        page_size: page.page_size,
        total,
        total_pages: page.total_pages(total),
        items,
    })
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Outcome of the settlement transaction, separated from `AppError` so the
/// callers can fold the duplicate-insert race into idempotent success.
enum SettlementError {
    /// The unique constraint fired: another request settled this pair first.
    AlreadyUnlocked,
    /// The locked row turned out closed or at capacity.
    Closed,
    /// Re-asserted business rule failed on the locked row.
    Denied(UnlockDenied),
    Database(sqlx::Error),
}

impl From<sqlx::Error> for SettlementError {
    fn from(e: sqlx::Error) -> Self {
        SettlementError::Database(e)
    }
}

/// The three-part settlement transaction.
///
/// 1. Insert the unlock row (unique pair constraint guards the race).
/// 2. Lock the service row, repair a non-positive stored value, bump the
///    occupancy counter, transition status.
/// 3. Debit credits when the unlock is credit-paid, clamped at zero.
async fn commit_settlement(
    pool: &PgPool,
    professional_id: DbId,
    service: &ServiceRequest,
    cost: i32,
    entitlement: Entitlement,
    exclusive: bool,
) -> Result<(), SettlementError> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query("INSERT INTO unlocks (professional_id, service_id) VALUES ($1, $2)")
        .bind(professional_id)
        .bind(service.id)
        .execute(&mut *tx)
        .await;

    if let Err(e) = inserted {
        if is_unlock_pair_violation(&e) {
            return Err(SettlementError::AlreadyUnlocked);
        }
        return Err(e.into());
    }

    let locked: ServiceRequest = sqlx::query_as(
        "SELECT id, title, description, category, urgency, address, status, client_id, \
                value, professional_slots, created_at, updated_at
         FROM service_requests WHERE id = $1 FOR UPDATE",
    )
    .bind(service.id)
    .fetch_one(&mut *tx)
    .await?;

    if exclusive && locked.professional_slots > 0 {
        // Lost the race for exclusivity; roll back the inserted unlock row.
        return Err(SettlementError::Denied(UnlockDenied::ExclusivityUnavailable));
    }

    // Re-assert openness on the locked row: a concurrent settlement may have
    // closed the request between the pre-check and the lock.
    if !exclusive
        && (locked.professional_slots >= MAX_PROFESSIONALS_PER_SERVICE
            || ServiceStatus::from_str(&locked.status) != Some(ServiceStatus::Pending))
    {
        return Err(SettlementError::Closed);
    }

    let (slots, status) = admit_professional(locked.professional_slots, exclusive);

    sqlx::query(
        "UPDATE service_requests SET
            value = $1,
            professional_slots = $2,
            status = $3,
            updated_at = NOW()
         WHERE id = $4",
    )
    .bind(effective_value(locked.value))
    .bind(slots)
    .bind(status.as_str())
    .bind(service.id)
    .execute(&mut *tx)
    .await?;

    // Exclusive unlocks always pay with credits; standard unlocks only when
    // not subscription-covered. The debit clamps at zero.
    if exclusive || entitlement.debits_credits() {
        sqlx::query(
            "UPDATE users SET credits = GREATEST(credits - $1, 0), updated_at = NOW()
             WHERE id = $2",
        )
        .bind(cost)
        .bind(professional_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// The denial returned for unlock attempts on a closed request.
fn closed_error() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Service request is closed to further unlocks".into(),
    ))
}

/// Whether a sqlx error is the unlock-pair unique violation.
fn is_unlock_pair_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some("uq_unlocks_professional_service")
        }
        _ => false,
    }
}

/// Fetch a service request or fail with 404.
async fn require_service(pool: &PgPool, service_id: DbId) -> AppResult<ServiceRequest> {
    ServiceRequestRepo::find_by_id(pool, service_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Service",
            id: service_id,
        }))
}

/// Evaluate the professional's entitlement against a cost.
async fn load_entitlement(
    pool: &PgPool,
    professional_id: DbId,
    cost: i32,
) -> AppResult<Entitlement> {
    let subscription = SubscriptionRepo::find_by_user(pool, professional_id).await?;
    let user = UserRepo::find_by_id(pool, professional_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: professional_id,
        }))?;

    Ok(Entitlement::evaluate(
        subscription.as_ref().and_then(|s| s.subscription_id.as_deref()),
        user.credits,
        cost,
    ))
}

/// Build a detail view with contact fields revealed.
async fn reveal(pool: &PgPool, service: ServiceRequest) -> AppResult<ServiceDetail> {
    let contact = client_contact(pool, &service).await?;
    Ok(ServiceDetail {
        service,
        contact: Some(contact),
    })
}

/// Look up the owning client's contact fields.
async fn client_contact(pool: &PgPool, service: &ServiceRequest) -> AppResult<ContactInfo> {
    let client = UserRepo::find_by_id(pool, service.client_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: service.client_id,
        }))?;

    Ok(ContactInfo {
        email: client.email,
        phone: client.phone,
    })
}

//! Unlock/settlement decision rules.
//!
//! A professional gains access to a service request's contact details by
//! "unlocking" it, paying either with an active subscription or with
//! credits. The functions here are the pure half of that workflow: given
//! what is known about the professional and the request, they decide
//! whether the unlock may proceed, what it costs, and how the request's
//! occupancy and status change. The transactional half (row locking,
//! inserts, the clamped debit) lives in the API crate's settlement engine
//! and must agree with these rules.

use serde::Serialize;

use crate::status::ServiceStatus;

/// Unlock cost applied when a request is created without a usable value,
/// and used to repair legacy zero-value rows during settlement.
pub const DEFAULT_SERVICE_VALUE: i32 = 50;

/// Maximum number of distinct professionals that may unlock one request.
/// Reaching the cap closes the request to further unlocks.
pub const MAX_PROFESSIONALS_PER_SERVICE: i32 = 4;

/// Business-rule denial returned by the settlement engine.
///
/// These are terminal for the request: the caller is told why and nothing
/// is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnlockDenied {
    /// Neither an active subscription nor a sufficient credit balance.
    #[error("neither an active subscription nor sufficient credits")]
    InsufficientEntitlement,

    /// Credit balance does not cover the cost (exclusive unlocks are never
    /// subscription-covered).
    #[error("credit balance does not cover the unlock cost")]
    InsufficientCredits,

    /// Another professional already holds an unlock on this request, so an
    /// exclusive unlock is no longer possible.
    #[error("request has already been unlocked by another professional")]
    ExclusivityUnavailable,
}

/// The effective unlock cost of a request.
///
/// Stored values of zero or less are legacy rows from before costs existed;
/// they settle at [`DEFAULT_SERVICE_VALUE`].
pub fn effective_value(stored_value: i32) -> i32 {
    if stored_value <= 0 {
        DEFAULT_SERVICE_VALUE
    } else {
        stored_value
    }
}

/// What the professional brings to the settlement.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Entitlement {
    pub has_subscription: bool,
    pub has_credits: bool,
}

impl Entitlement {
    /// Evaluate entitlement against a request's effective cost.
    ///
    /// `subscription_id` is the externally-issued subscription identifier,
    /// if any; an empty string means "customer record exists but no active
    /// subscription" and does not count.
    pub fn evaluate(subscription_id: Option<&str>, credits: i32, cost: i32) -> Self {
        Entitlement {
            has_subscription: subscription_id.is_some_and(|s| !s.is_empty()),
            has_credits: credits >= cost,
        }
    }

    /// A standard unlock needs at least one of the two.
    pub fn check_standard(self) -> Result<(), UnlockDenied> {
        if self.has_subscription || self.has_credits {
            Ok(())
        } else {
            Err(UnlockDenied::InsufficientEntitlement)
        }
    }

    /// An exclusive unlock requires credits regardless of subscription.
    pub fn check_exclusive(self) -> Result<(), UnlockDenied> {
        if self.has_credits {
            Ok(())
        } else {
            Err(UnlockDenied::InsufficientCredits)
        }
    }

    /// Whether settlement debits the credit balance. Subscription covers a
    /// standard unlock; only credit-paying unlocks debit.
    pub fn debits_credits(self) -> bool {
        !self.has_subscription && self.has_credits
    }
}

/// The credit balance after a debit, clamped at zero.
///
/// Going negative is a decision, not an error: the balance is simply
/// exhausted.
pub fn debit_clamped(credits: i32, cost: i32) -> i32 {
    (credits - cost).max(0)
}

/// Occupancy and status after admitting one more professional.
///
/// Returns the new slot count and the resulting status. `exclusive` closes
/// the request unconditionally; otherwise closure happens exactly when the
/// cap is reached.
pub fn admit_professional(current_slots: i32, exclusive: bool) -> (i32, ServiceStatus) {
    let slots = current_slots + 1;
    let status = if exclusive || slots >= MAX_PROFESSIONALS_PER_SERVICE {
        ServiceStatus::Closed
    } else {
        ServiceStatus::Pending
    };
    (slots, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- effective_value -----------------------------------------------------

    #[test]
    fn effective_value_repairs_non_positive() {
        assert_eq!(effective_value(0), DEFAULT_SERVICE_VALUE);
        assert_eq!(effective_value(-10), DEFAULT_SERVICE_VALUE);
    }

    #[test]
    fn effective_value_keeps_positive() {
        assert_eq!(effective_value(1), 1);
        assert_eq!(effective_value(150), 150);
    }

    // -- Entitlement ---------------------------------------------------------

    #[test]
    fn subscription_alone_entitles_standard_unlock() {
        let e = Entitlement::evaluate(Some("sub_123"), 0, 150);
        assert!(e.has_subscription);
        assert!(!e.has_credits);
        assert!(e.check_standard().is_ok());
        assert!(!e.debits_credits());
    }

    #[test]
    fn empty_subscription_id_does_not_count() {
        let e = Entitlement::evaluate(Some(""), 0, 150);
        assert!(!e.has_subscription);
        assert_eq!(
            e.check_standard(),
            Err(UnlockDenied::InsufficientEntitlement)
        );
    }

    #[test]
    fn credits_alone_entitle_standard_unlock() {
        let e = Entitlement::evaluate(None, 150, 150);
        assert!(e.has_credits);
        assert!(e.check_standard().is_ok());
        assert!(e.debits_credits());
    }

    #[test]
    fn neither_denies_standard_unlock() {
        let e = Entitlement::evaluate(None, 149, 150);
        assert_eq!(
            e.check_standard(),
            Err(UnlockDenied::InsufficientEntitlement)
        );
    }

    #[test]
    fn subscription_never_debits() {
        // Even with a covering balance, the subscription pays.
        let e = Entitlement::evaluate(Some("sub_123"), 500, 150);
        assert!(!e.debits_credits());
    }

    #[test]
    fn exclusive_requires_credits_despite_subscription() {
        let e = Entitlement::evaluate(Some("sub_123"), 0, 150);
        assert_eq!(e.check_exclusive(), Err(UnlockDenied::InsufficientCredits));

        let e = Entitlement::evaluate(Some("sub_123"), 150, 150);
        assert!(e.check_exclusive().is_ok());
    }

    // -- debit_clamped -------------------------------------------------------

    #[test]
    fn debit_exact_balance_reaches_zero() {
        assert_eq!(debit_clamped(150, 150), 0);
    }

    #[test]
    fn debit_never_goes_negative() {
        assert_eq!(debit_clamped(100, 150), 0);
        assert_eq!(debit_clamped(0, 1), 0);
    }

    #[test]
    fn debit_leaves_remainder() {
        assert_eq!(debit_clamped(200, 150), 50);
    }

    // -- admit_professional --------------------------------------------------

    #[test]
    fn below_cap_stays_pending() {
        assert_eq!(admit_professional(0, false), (1, ServiceStatus::Pending));
        assert_eq!(admit_professional(2, false), (3, ServiceStatus::Pending));
    }

    #[test]
    fn reaching_cap_closes() {
        // counter=3 -> unlock -> 4 -> closed
        assert_eq!(admit_professional(3, false), (4, ServiceStatus::Closed));
    }

    #[test]
    fn exclusive_closes_from_empty() {
        assert_eq!(admit_professional(0, true), (1, ServiceStatus::Closed));
    }
}

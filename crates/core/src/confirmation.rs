//! Email confirmation codes.
//!
//! Registration leaves an account unconfirmed until the owner echoes back a
//! short-lived numeric code delivered by email. Codes are single-use: a
//! successful confirmation clears the stored code, and confirming an
//! already-confirmed account is an idempotent no-op.

use chrono::Duration;
use rand::Rng;

use crate::types::Timestamp;

/// Number of digits in a confirmation code.
pub const CODE_LENGTH: u32 = 6;

/// How long an issued code stays valid.
pub const CODE_TTL_MINUTES: i64 = 1;

/// Generate a zero-padded numeric confirmation code.
pub fn generate_code() -> String {
    let max = 10u32.pow(CODE_LENGTH);
    let n: u32 = rand::rng().random_range(0..max);
    format!("{n:0width$}", width = CODE_LENGTH as usize)
}

/// Expiry instant for a code issued at `now`.
pub fn expiry_from(now: Timestamp) -> Timestamp {
    now + Duration::minutes(CODE_TTL_MINUTES)
}

/// Result of applying a submitted code to an account's confirmation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The account was already confirmed; nothing to do.
    AlreadyConfirmed,
    /// The code matched before expiry; the account becomes confirmed.
    Confirmed,
    /// Wrong code, missing code, or past expiry.
    InvalidOrExpired,
}

/// Decide the outcome of a confirmation attempt.
///
/// `issued_code` / `expires_at` are the stored values (absent once
/// confirmed or never issued). Comparison is exact; whitespace around the
/// submitted code is the caller's problem to trim.
pub fn confirm(
    already_confirmed: bool,
    issued_code: Option<&str>,
    expires_at: Option<Timestamp>,
    submitted_code: &str,
    now: Timestamp,
) -> ConfirmOutcome {
    if already_confirmed {
        return ConfirmOutcome::AlreadyConfirmed;
    }
    match (issued_code, expires_at) {
        (Some(code), Some(expiry)) if code == submitted_code && now <= expiry => {
            ConfirmOutcome::Confirmed
        }
        _ => ConfirmOutcome::InvalidOrExpired,
    }
}

//! Well-known role name constants and the account role enumeration.
//!
//! Role strings must match the CHECK constraint on `users.role` in
//! `0001_initial.sql`.

use serde::{Deserialize, Serialize};

pub const ROLE_CLIENT: &str = "client";
pub const ROLE_PROFESSIONAL: &str = "professional";

/// Account role: a client posts service requests, a professional unlocks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Client,
    Professional,
}

impl UserRole {
    /// Stable string stored in the `users.role` column.
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Client => ROLE_CLIENT,
            UserRole::Professional => ROLE_PROFESSIONAL,
        }
    }

    /// Parse the numeric registration code used by the public API
    /// (1 = client, 2 = professional).
    pub fn from_registration_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(UserRole::Client),
            2 => Some(UserRole::Professional),
            _ => None,
        }
    }

    /// Parse the stored column value.
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            ROLE_CLIENT => Some(UserRole::Client),
            ROLE_PROFESSIONAL => Some(UserRole::Professional),
            _ => None,
        }
    }
}

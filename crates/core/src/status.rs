//! Service request lifecycle status.
//!
//! Status is a closed two-state enumeration. A request is `Pending` from
//! creation until either its professional-slot cap is reached or an
//! exclusive unlock removes it from the open pool, after which it is
//! `Closed` and excluded from search results. No other states exist and no
//! transition out of `Closed` is possible.

use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CLOSED: &str = "closed";

/// Lifecycle status stored in `service_requests.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Pending,
    Closed,
}

impl ServiceStatus {
    /// Stable string stored in the database column.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Pending => STATUS_PENDING,
            ServiceStatus::Closed => STATUS_CLOSED,
        }
    }

    /// Parse the stored column value.
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            STATUS_PENDING => Some(ServiceStatus::Pending),
            STATUS_CLOSED => Some(ServiceStatus::Closed),
            _ => None,
        }
    }
}

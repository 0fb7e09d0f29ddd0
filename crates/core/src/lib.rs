//! Domain logic for the Servia marketplace backend.
//!
//! This crate has no internal dependencies and no I/O: it holds the error
//! taxonomy, shared id/timestamp types, role and status enumerations, the
//! unlock/settlement decision rules, the email-confirmation state machine,
//! and search/pagination helpers. Everything that touches the database or
//! the network lives in `servia-db` / `servia-api`.

pub mod confirmation;
pub mod error;
pub mod roles;
pub mod search;
pub mod status;
pub mod types;
pub mod unlock;

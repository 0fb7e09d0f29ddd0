//! Outbound payment-provider clients and inbound webhook verification.

pub mod billing;
pub mod orders;
pub mod signature;

/// Error type for payment-provider calls.
///
/// Provider internals never reach API clients: handlers log the detail and
/// surface a generic upstream error.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider response was missing an expected field.
    #[error("Unexpected provider response: {0}")]
    Malformed(String),
}

//! Webhook signature verification.
//!
//! Both payment providers sign webhook deliveries with an
//! `t=<unix-ts>,v1=<hex hmac-sha256>` header, where the MAC is computed over
//! `"{t}.{raw body}"` with the endpoint's signing secret. Verification
//! rejects stale timestamps and compares digests in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a signed webhook, in seconds.
const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Error type for signature verification failures.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("malformed signature header")]
    Malformed,

    #[error("webhook timestamp outside tolerance")]
    StaleTimestamp,

    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a webhook signature header against the raw request body.
///
/// `now` is the current Unix timestamp, passed in so verification is
/// deterministic under test.
pub fn verify_signature(
    header: &str,
    body: &[u8],
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let (timestamp, provided_hex) = parse_header(header)?;

    if (now - timestamp).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(SignatureError::StaleTimestamp);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::Malformed)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    let expected = mac.finalize().into_bytes();

    let expected_hex = to_hex(&expected);
    if constant_time_eq(expected_hex.as_bytes(), provided_hex.as_bytes()) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Compute the signature header value for a payload. Used by tests and by
/// provider simulators.
pub fn sign(body: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    format!("t={timestamp},v1={}", to_hex(&mac.finalize().into_bytes()))
}

/// Split `t=...,v1=...` into (timestamp, hex digest).
fn parse_header(header: &str) -> Result<(i64, &str), SignatureError> {
    let mut timestamp = None;
    let mut digest = None;

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => digest = Some(value),
            _ => {}
        }
    }

    match (timestamp, digest) {
        (Some(t), Some(d)) if !d.is_empty() => Ok((t, d)),
        _ => Err(SignatureError::Malformed),
    }
}

/// Lowercase hex encoding.
fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Constant-time byte comparison: length leaks, contents do not.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";

    #[test]
    fn valid_signature_verifies() {
        let body = br#"{"event":"payment.confirmed"}"#;
        let now = 1_700_000_000;
        let header = sign(body, SECRET, now);
        assert_eq!(verify_signature(&header, body, SECRET, now), Ok(()));
    }

    #[test]
    fn tampered_body_rejected() {
        let now = 1_700_000_000;
        let header = sign(b"original", SECRET, now);
        assert_eq!(
            verify_signature(&header, b"tampered", SECRET, now),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn wrong_secret_rejected() {
        let now = 1_700_000_000;
        let header = sign(b"payload", SECRET, now);
        assert_eq!(
            verify_signature(&header, b"payload", "whsec_other", now),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn stale_timestamp_rejected() {
        let signed_at = 1_700_000_000;
        let header = sign(b"payload", SECRET, signed_at);
        assert_eq!(
            verify_signature(&header, b"payload", SECRET, signed_at + 301),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn within_tolerance_accepted() {
        let signed_at = 1_700_000_000;
        let header = sign(b"payload", SECRET, signed_at);
        assert_eq!(
            verify_signature(&header, b"payload", SECRET, signed_at + 299),
            Ok(())
        );
    }

    #[test]
    fn malformed_header_rejected() {
        assert_eq!(
            verify_signature("not-a-header", b"payload", SECRET, 0),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_signature("t=abc,v1=", b"payload", SECRET, 0),
            Err(SignatureError::Malformed)
        );
    }
}

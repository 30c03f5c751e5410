//! Webhook signature verification
//!
//! The provider signs each delivery with a header of the form
//! `t=<unix-seconds>,v1=<hex hmac>`, where the MAC is HMAC-SHA256 over
//! `"{t}.{raw body}"` keyed by the endpoint secret. Multiple `v1`
//! entries may be present during secret rotation; any valid one
//! passes. The timestamp must be within the tolerance window to bound
//! replay.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{ServerError, ServerResult};

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted clock skew between the signed timestamp and now
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verify a signature header against the raw request body.
///
/// `now` is unix seconds; passed in so the window is testable.
pub fn verify(payload: &[u8], header: &str, secret: &str, now: i64) -> ServerResult<()> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(
                    value
                        .parse()
                        .map_err(|_| ServerError::InvalidSignature("bad timestamp".into()))?,
                );
            }
            Some(("v1", value)) => candidates.push(value),
            // other schemes (v0 test-mode signatures) are ignored
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| ServerError::InvalidSignature("missing timestamp".into()))?;
    if candidates.is_empty() {
        return Err(ServerError::InvalidSignature("missing v1 signature".into()));
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(ServerError::InvalidSignature(
            "timestamp outside tolerance".into(),
        ));
    }

    for candidate in candidates {
        let Ok(candidate) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| ServerError::Internal(format!("hmac key: {}", e)))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        if mac.verify_slice(&candidate).is_ok() {
            return Ok(());
        }
    }

    Err(ServerError::InvalidSignature("no matching signature".into()))
}

/// Produce a valid signature header for a payload. Test fixtures and
/// local delivery tooling use this to exercise the verified path.
pub fn sign(payload: &[u8], secret: &str, timestamp: i64) -> ServerResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ServerError::Internal(format!("hmac key: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}

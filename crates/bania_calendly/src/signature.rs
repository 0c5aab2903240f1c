//! Calendly webhook signatures.
//!
//! The `Calendly-Webhook-Signature` header looks like `t=<unix ts>,v1=<hex>`
//! where the digest is HMAC-SHA256 over `"<t>.<raw body>"` keyed with the
//! webhook signing key.

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::error::CalendlyError;

pub const SIGNATURE_HEADER: &str = "calendly-webhook-signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, PartialEq, Eq)]
pub struct SignatureHeader<'a> {
    pub timestamp: &'a str,
    pub v1: Vec<&'a str>,
}

pub fn parse_signature_header(header: &str) -> Result<SignatureHeader<'_>, CalendlyError> {
    let mut timestamp = None;
    let mut v1 = Vec::new();

    for item in header.split(',') {
        if let Some((key, value)) = item.trim().split_once('=') {
            match key {
                "t" => timestamp = Some(value),
                "v1" => v1.push(value),
                _ => {}
            }
        }
    }

    let timestamp = timestamp
        .filter(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| CalendlyError::SignatureError("missing or malformed timestamp".to_string()))?;
    if v1.is_empty() {
        return Err(CalendlyError::SignatureError("missing v1 signature".to_string()));
    }
    Ok(SignatureHeader { timestamp, v1 })
}

/// Hex digest Calendly would send for this body.
pub fn compute_signature(signing_key: &str, timestamp: &str, body: &[u8]) -> Result<String, CalendlyError> {
    let mut mac = HmacSha256::new_from_slice(signing_key.as_bytes())
        .map_err(|e| CalendlyError::SignatureError(format!("invalid signing key: {}", e)))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies `body` against the signature header. Any matching `v1` entry passes.
pub fn verify_signature(
    body: &[u8],
    header: Option<&str>,
    signing_key: &str,
) -> Result<(), CalendlyError> {
    let header = header
        .ok_or_else(|| CalendlyError::SignatureError("missing signature header".to_string()))?;
    let parsed = parse_signature_header(header)?;
    let expected = compute_signature(signing_key, parsed.timestamp, body)?;

    let matched = parsed
        .v1
        .iter()
        .any(|candidate| constant_time_eq(candidate.to_ascii_lowercase().as_bytes(), expected.as_bytes()));
    if matched {
        debug!("Calendly signature verified (t={})", parsed.timestamp);
        Ok(())
    } else {
        Err(CalendlyError::SignatureError("signature mismatch".to_string()))
    }
}

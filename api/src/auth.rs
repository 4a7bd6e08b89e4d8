//! Webhook authentication.
//!
//! Two schemes: a shared-secret header for internal endpoints and an
//! HMAC-SHA256 body signature for the chain provider's webhook. Both
//! comparisons are constant-time; secrets are hashed before comparison so
//! not even the length check is data-dependent.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Header carrying the shared secret on internal endpoints.
pub const SECRET_HEADER: &str = "x-webhook-secret";

/// Header carrying the hex HMAC signature on the chain webhook.
pub const CHAIN_SIGNATURE_HEADER: &str = "x-chain-signature";

/// Constant-time equality over the SHA-256 digests of both sides.
fn digests_match(a: &[u8], b: &[u8]) -> bool {
    let da = Sha256::digest(a);
    let db = Sha256::digest(b);
    da.as_slice().ct_eq(db.as_slice()).into()
}

/// Check the shared-secret header against the configured secret.
///
/// An empty configured secret never authenticates — a missing deployment
/// secret must fail closed, not open.
pub fn verify_shared_secret(headers: &HeaderMap, secret: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let presented = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    digests_match(presented.as_bytes(), secret.as_bytes())
}

/// Verify the chain webhook's HMAC-SHA256 signature over the raw body.
pub fn verify_chain_signature(headers: &HeaderMap, body: &[u8], secret: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let signature_hex = match headers.get(CHAIN_SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(s) => s,
        None => return false,
    };
    let presented = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);
    mac.verify_slice(&presented).is_ok()
}

/// Compute the hex HMAC signature a legitimate chain provider would send.
pub fn sign_chain_body(body: &[u8], secret: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn shared_secret_accepts_exact_match_only() {
        let headers = headers_with(SECRET_HEADER, "hunter2");
        assert!(verify_shared_secret(&headers, "hunter2"));
        assert!(!verify_shared_secret(&headers, "hunter3"));
        assert!(!verify_shared_secret(&HeaderMap::new(), "hunter2"));
    }

    #[test]
    fn empty_configured_secret_fails_closed() {
        let headers = headers_with(SECRET_HEADER, "");
        assert!(!verify_shared_secret(&headers, ""));
    }

    #[test]
    fn chain_signature_roundtrip() {
        let body = br#"{"signature":"sigA"}"#;
        let signature = sign_chain_body(body, "chain-secret");
        let headers = headers_with(CHAIN_SIGNATURE_HEADER, &signature);
        assert!(verify_chain_signature(&headers, body, "chain-secret"));
        assert!(!verify_chain_signature(&headers, b"tampered", "chain-secret"));
        assert!(!verify_chain_signature(&headers, body, "other-secret"));
    }

    #[test]
    fn malformed_hex_signature_is_rejected() {
        let headers = headers_with(CHAIN_SIGNATURE_HEADER, "not-hex!");
        assert!(!verify_chain_signature(&headers, b"body", "chain-secret"));
    }
}

//! Webhook signature primitives
//!
//! The gateway signs every webhook delivery with HMAC-SHA512 over the raw
//! request body, keyed by the integration secret, and sends the hex digest
//! in a header. Verification must run before the body is trusted for
//! anything, and must compare in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Computes the hex HMAC-SHA512 signature for a body
///
/// Used by tests (and any outbound signing) to produce signatures the
/// verifier accepts.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex HMAC-SHA512 signature against a body
///
/// The comparison runs in constant time (`Mac::verify_slice`), so the
/// verifier leaks nothing about how much of a forged signature matched.
pub fn verify(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

//! Payload signing.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs a payload with an endpoint secret.
///
/// Returns the HMAC-SHA256 tag as lowercase hex, exactly as carried in
/// the `X-Webhook-Signature` header. The payload must be the stored body
/// verbatim; signing anything re-serialized would break verification on
/// the subscriber side.
#[must_use]
pub fn sign_payload(secret: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

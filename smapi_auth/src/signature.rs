//! HMAC signing and verification over canonical messages.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Compute the base64-encoded HMAC-SHA256 of `message` under `secret_key`.
///
/// Pure function of its inputs: the same key and message always produce the same signature.
pub fn sign(secret_key: &str, message: &str) -> String {
    let mut mac = hmac_for(secret_key);
    mac.update(message.as_bytes());
    base64::encode(mac.finalize().into_bytes())
}

/// Recompute the signature for `message` and compare it with the one supplied.
///
/// The comparison runs in constant time with respect to the expected tag (`Mac::verify_slice`),
/// so an attacker cannot learn the correct signature byte by byte from response timing. A
/// signature that is not valid base64 simply fails verification.
pub fn verify(secret_key: &str, message: &str, signature: &str) -> bool {
    let provided = match base64::decode(signature.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let mut mac = hmac_for(secret_key);
    mac.update(message.as_bytes());
    mac.verify_slice(&provided).is_ok()
}

fn hmac_for(secret_key: &str) -> HmacSha256 {
    // Keep our copy of the key material on a zeroed-on-drop buffer.
    let key = Zeroizing::new(secret_key.as_bytes().to_vec());
    // HMAC accepts keys of any length, so this cannot fail.
    HmacSha256::new_from_slice(&key).expect("HMAC accepts keys of any length")
}

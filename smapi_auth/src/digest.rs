//! The request body integrity digest.

use md5::{Digest, Md5};

/// Compute the `Content-Md5` value for a request body: the base64 encoding of the body's MD5
/// digest.
///
/// An empty body has no digest. The empty string means "not applicable" here, *not* the MD5 of
/// zero bytes — methods that carry no body (GET, DELETE) sign an empty digest field and send no
/// digest header at all.
///
/// MD5 is fine in this role. The digest is a non-secret transport-integrity check; authenticity
/// comes from the HMAC signature, not from this hash.
pub fn content_md5(body: &[u8]) -> String {
    if body.is_empty() {
        return String::new();
    }
    base64::encode(Md5::digest(body))
}

#[cfg(test)]
mod test {
    use super::content_md5;

    #[test]
    fn empty_body_has_no_digest() {
        assert_eq!(content_md5(b""), "");
    }

    #[test]
    fn known_digest_values() {
        // Independently verified: md5("{}") = 99914b932bd37a50b983c5e7c90ae93b
        assert_eq!(content_md5(b"{}"), "mZFLkyvTelC5g8XnyQrpOw==");
        assert_eq!(content_md5(b"hello world"), "XrY7u+Ae7tCTyyK7j1rNww==");
    }

    #[test]
    fn digest_is_body_sensitive() {
        assert_ne!(content_md5(b"{}"), content_md5(b"{\"x\":1}"));
    }
}

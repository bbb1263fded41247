//! Wire-level names shared by signer and verifier.
//!
//! The custom header names carry a vendor prefix so they cannot collide with standard headers
//! (RFC 6648 discourages the old `X-` convention). Both sides of the protocol must use these
//! constants; the canonical message depends on the header *values*, so a renamed header silently
//! breaks nothing, but a mis-routed value breaks everything.

/// The authorization scheme name, including the protocol version.
pub const AUTH_SCHEME: &str = "SmNetHmac1";

/// Request header carrying the client's signing timestamp.
pub const DATE_HEADER: &str = "SmNet-Api-Date";

/// Request header carrying the caller's public key.
pub const PUBLIC_KEY_HEADER: &str = "SmNet-Api-PublicKey";

/// Request header carrying the base64 MD5 digest of the request body, when a body is present.
pub const CONTENT_MD5_HEADER: &str = "Content-Md5";

/// Response header carrying the numeric verification result id.
pub const AUTH_RESULT_ID_HEADER: &str = "SmNet-Api-AuthResultId";

/// Response header carrying the short human-readable verification result description.
pub const AUTH_RESULT_DESC_HEADER: &str = "SmNet-Api-AuthResultDesc";

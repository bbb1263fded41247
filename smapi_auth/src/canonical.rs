//! Canonical message construction.
//!
//! The canonical message is the exact byte string the HMAC is computed over. Signer and verifier
//! build it independently — the client from the request it is about to send, the server from the
//! request it actually received — and the two renditions must be byte-identical for the same
//! logical request. Every normalization rule in this module exists to make that reproducible.
//!
//! ## Message format
//!
//! Six fields joined with a single `\n`, in this fixed order:
//!
//! ```text
//!     {method}\n{content_md5}\n{accept}\n{url}\n{timestamp}\n{public_key}
//! ```
//!
//! where method, accept type, URL, timestamp and public key are lower-cased, and `content_md5` is
//! the base64 body digest exactly as sent (or the empty string for body-less requests). None of
//! the fields may themselves contain a newline; this is an accepted design constraint of the
//! protocol and is not enforced by escaping.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// The ordered list of timestamp formats the verifier will accept, tried in sequence. First match
/// wins. Extend the list rather than loosening an existing entry.
///
/// The first entry is the pinned wire format ([`format_timestamp`]); the others tolerate clients
/// that omit the trailing `Z` or use a space separator.
pub const TIMESTAMP_FORMATS: &[&str] =
    &["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// How the URL's query string is treated when the canonical message is built.
///
/// Some HTTP stacks decode percent-escapes before the signature is checked, in which case the
/// verifier sees a different byte string than the client signed. Deployments behind such stacks
/// set `Decoded` on *both* sides. The two sides must always agree on this value — it is pinned by
/// configuration, never inferred at runtime — or signatures will mismatch for any URL containing
/// escaped characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryEncoding {
    /// Sign the query string exactly as it appears in the request line.
    #[default]
    Raw,
    /// Percent-decode the query string before signing.
    Decoded,
}

impl FromStr for QueryEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(QueryEncoding::Raw),
            "decoded" => Ok(QueryEncoding::Decoded),
            other => Err(format!("'{other}' is not a query encoding mode. Use 'raw' or 'decoded'.")),
        }
    }
}

/// The signable facts of one request. Ephemeral — built fresh per request on each side and
/// discarded after the signature is computed or checked.
#[derive(Debug, Clone)]
pub struct RequestFacts {
    pub method: String,
    /// Base64 MD5 of the body, or empty when no body digest applies.
    pub content_md5: String,
    pub accept: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub public_key: String,
}

/// Build the canonical message for the given facts.
pub fn build_canonical_message(facts: &RequestFacts, mode: QueryEncoding) -> String {
    [
        facts.method.to_lowercase(),
        facts.content_md5.clone(),
        facts.accept.to_lowercase(),
        canonicalize_url(&facts.url, mode),
        format_timestamp(facts.timestamp).to_lowercase(),
        facts.public_key.to_lowercase(),
    ]
    .join("\n")
}

/// Lower-case the URL and, in [`QueryEncoding::Decoded`] mode, percent-decode its query string.
pub fn canonicalize_url(url: &str, mode: QueryEncoding) -> String {
    let lowered = url.to_lowercase();
    match mode {
        QueryEncoding::Raw => lowered,
        QueryEncoding::Decoded => match lowered.split_once('?') {
            Some((path, query)) => {
                let decoded = urlencoding::decode(query)
                    .map(|q| q.into_owned())
                    .unwrap_or_else(|_| query.to_string());
                format!("{path}?{decoded}")
            },
            None => lowered,
        },
    }
}

/// Render a timestamp in the pinned wire format: ISO-8601 UTC with a seven-digit fractional
/// second and a trailing `Z`, e.g. `2020-01-01T00:00:00.0000000Z`.
///
/// Both sides re-render the timestamp through this function when building the canonical message,
/// so the signature never depends on how many fractional digits the client's clock happened to
/// produce.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    let ticks = timestamp.timestamp_subsec_nanos() / 100;
    format!("{}.{:07}Z", timestamp.format("%Y-%m-%dT%H:%M:%S"), ticks)
}

/// Parse a timestamp header value against [`TIMESTAMP_FORMATS`], first match wins. All formats
/// are interpreted as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

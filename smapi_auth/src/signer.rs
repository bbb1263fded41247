//! The client role: turning an outgoing request into a signed header set.

use chrono::{DateTime, Utc};
use smapi_common::Secret;
use thiserror::Error;
use url::Url;

use crate::{
    canonical::{build_canonical_message, format_timestamp, QueryEncoding, RequestFacts},
    digest::content_md5,
    headers::{AUTH_SCHEME, CONTENT_MD5_HEADER, DATE_HEADER, PUBLIC_KEY_HEADER},
    signature,
};

#[derive(Debug, Clone, Error)]
pub enum SigningError {
    #[error("Cannot sign a request without a value for the {0}.")]
    MissingField(&'static str),
    #[error("The request URL could not be parsed. {0}")]
    InvalidUrl(String),
}

/// The headers to attach to a signed outgoing request.
#[derive(Debug, Clone)]
pub struct SignedRequestHeaders {
    pub date: String,
    pub public_key: String,
    /// Present only when the request carries a body.
    pub content_md5: Option<String>,
    /// The full `Authorization` header value, scheme included.
    pub authorization: String,
}

impl SignedRequestHeaders {
    /// The headers as name/value pairs, ready to be attached to an HTTP request.
    pub fn as_header_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (DATE_HEADER, self.date.clone()),
            (PUBLIC_KEY_HEADER, self.public_key.clone()),
            ("Authorization", self.authorization.clone()),
        ];
        if let Some(md5) = &self.content_md5 {
            pairs.push((CONTENT_MD5_HEADER, md5.clone()));
        }
        pairs
    }
}

/// Signs outgoing requests for one credential pair.
///
/// Signing has no side effects and touches no shared state; each call draws a fresh timestamp and
/// produces a header set bound to exactly that request.
pub struct RequestSigner {
    public_key: String,
    secret_key: Secret<String>,
    query_encoding: QueryEncoding,
}

impl RequestSigner {
    pub fn new(public_key: impl Into<String>, secret_key: Secret<String>) -> Self {
        Self { public_key: public_key.into(), secret_key, query_encoding: QueryEncoding::default() }
    }

    /// Set the query canonicalization mode. Must match the verifier's configuration.
    pub fn with_query_encoding(mut self, mode: QueryEncoding) -> Self {
        self.query_encoding = mode;
        self
    }

    /// Sign a request at the current time. This is the normal entry point; timestamps are never
    /// reused between calls.
    pub fn sign_request(
        &self,
        method: &str,
        accept: &str,
        url: &str,
        body: &[u8],
    ) -> Result<SignedRequestHeaders, SigningError> {
        self.sign_request_at(method, accept, url, body, Utc::now())
    }

    /// Sign a request at an explicit timestamp. Useful for pre-signed requests and for
    /// deterministic signing; [`RequestSigner::sign_request`] wraps this with `Utc::now()`.
    pub fn sign_request_at(
        &self,
        method: &str,
        accept: &str,
        url: &str,
        body: &[u8],
        timestamp: DateTime<Utc>,
    ) -> Result<SignedRequestHeaders, SigningError> {
        // Fail fast rather than send a request the server can never verify.
        required("public key", &self.public_key)?;
        required("secret key", self.secret_key.reveal())?;
        required("HTTP method", method)?;
        required("accept type", accept)?;
        required("URL", url)?;
        Url::parse(url).map_err(|e| SigningError::InvalidUrl(e.to_string()))?;

        let digest = content_md5(body);
        let facts = RequestFacts {
            method: method.to_string(),
            content_md5: digest.clone(),
            accept: accept.to_string(),
            url: url.to_string(),
            timestamp,
            public_key: self.public_key.clone(),
        };
        let message = build_canonical_message(&facts, self.query_encoding);
        let signature = signature::sign(self.secret_key.reveal(), &message);
        Ok(SignedRequestHeaders {
            date: format_timestamp(timestamp),
            public_key: self.public_key.clone(),
            content_md5: (!digest.is_empty()).then_some(digest),
            authorization: format!("{AUTH_SCHEME} {signature}"),
        })
    }
}

fn required(name: &'static str, value: &str) -> Result<(), SigningError> {
    if value.trim().is_empty() {
        Err(SigningError::MissingField(name))
    } else {
        Ok(())
    }
}

//! The server role: the verification state machine.
//!
//! One request moves through a fixed sequence of checks and stops at the first failure:
//! authorization header → account lookup → timestamp and replay → body digest → signature. The
//! caller only ever sees a [`VerificationError`]; the expected signature, the stored replay state
//! and the account's secret are never part of any outcome.

use chrono::{DateTime, Duration, Utc};
use log::{error, trace, warn};
use serde::{Deserialize, Serialize};

use crate::{
    canonical::{build_canonical_message, parse_timestamp, QueryEncoding, RequestFacts},
    digest::content_md5,
    headers::AUTH_SCHEME,
    outcome::VerificationError,
    replay::ReplayGuard,
    signature,
    traits::AccountResolver,
};

/// Verification knobs. Signer and verifier deployments must agree on `query_encoding`; the window
/// settings are server policy.
#[derive(Debug, Clone, Copy)]
pub struct VerifierConfig {
    /// How far in the past a request timestamp may lie.
    pub window: Duration,
    /// How far ahead of the server's clock a timestamp may lie. Clients are expected to keep
    /// reasonable clocks; this only absorbs ordinary skew.
    pub clock_skew: Duration,
    pub query_encoding: QueryEncoding,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self { window: Duration::minutes(15), clock_skew: Duration::minutes(1), query_encoding: QueryEncoding::Raw }
    }
}

/// A request as observed by the server, reduced to the facts the protocol cares about.
///
/// The URL is the one the server itself reconstructs from the connection, not a client-supplied
/// string — the canonical message must be rebuilt from trusted observations.
#[derive(Debug, Clone, Default)]
pub struct ReceivedRequest {
    pub method: String,
    pub url: String,
    pub accept: String,
    pub authorization: Option<String>,
    pub public_key: Option<String>,
    pub date: Option<String>,
    pub content_md5: Option<String>,
    pub body: Vec<u8>,
}

/// The successful terminal state: who signed the request, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedRequest {
    pub public_key: String,
    pub timestamp: DateTime<Utc>,
}

/// Orchestrates verification over an account store, a replay guard and a configuration.
pub struct RequestVerifier<B> {
    accounts: B,
    replay: ReplayGuard,
    config: VerifierConfig,
}

impl<B> RequestVerifier<B> {
    pub fn new(accounts: B, replay: ReplayGuard, config: VerifierConfig) -> Self {
        Self { accounts, replay, config }
    }
}

impl<B> RequestVerifier<B>
where B: AccountResolver
{
    /// Verify a request against the server's current clock.
    pub async fn verify(&self, req: &ReceivedRequest) -> Result<AuthenticatedRequest, VerificationError> {
        self.verify_at(req, Utc::now()).await
    }

    /// Verify a request against an explicit clock reading.
    pub async fn verify_at(
        &self,
        req: &ReceivedRequest,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedRequest, VerificationError> {
        let signature_b64 = parse_authorization_header(req.authorization.as_deref())?;

        let public_key = req.public_key.as_deref().map(str::trim).unwrap_or_default();
        if public_key.is_empty() {
            warn!("🔐️ Request presented no public key. Denying access.");
            return Err(VerificationError::UnknownUser);
        }
        let account = match self.accounts.resolve_account(public_key).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                warn!("🔐️ No API account found for the presented public key. Denying access.");
                return Err(VerificationError::UnknownUser);
            },
            Err(e) => {
                // The store is a collaborator; its faults are availability problems, not auth
                // decisions, and must not bubble up as anything more detailed.
                error!("🔐️ Account lookup failed: {e}");
                return Err(VerificationError::ApiUnavailable);
            },
        };
        if !account.enabled {
            warn!("🔐️ API account {public_key} is disabled. Denying access.");
            return Err(VerificationError::UserDisabled);
        }

        let timestamp = req
            .date
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or(VerificationError::InvalidTimestamp)?;
        self.replay.check_and_update(public_key, timestamp, now, self.config.window, self.config.clock_skew)?;

        let received_md5 = req.content_md5.as_deref().map(str::trim).unwrap_or_default();
        if !received_md5.is_empty() && content_md5(&req.body) != received_md5 {
            warn!("🔐️ Content-Md5 header does not match the request body. Denying access.");
            return Err(VerificationError::ContentMd5NotMatching);
        }

        // The digest field in the canonical message is the *received header value*: the signature
        // binds the header, and body integrity rests on the separate digest check above. A valid
        // signature alone does not vouch for the body — a known weakness of the scheme, kept
        // as-is for wire compatibility.
        let facts = RequestFacts {
            method: req.method.clone(),
            content_md5: received_md5.to_string(),
            accept: req.accept.clone(),
            url: req.url.clone(),
            timestamp,
            public_key: public_key.to_string(),
        };
        let message = build_canonical_message(&facts, self.config.query_encoding);
        if !signature::verify(account.secret_key.reveal(), &message, &signature_b64) {
            warn!("🔐️ Invalid request signature for public key {public_key}. Denying access.");
            return Err(VerificationError::InvalidSignature);
        }

        trace!("🔐️ Request authenticated for public key {public_key} ✅️");
        Ok(AuthenticatedRequest { public_key: public_key.to_string(), timestamp })
    }
}

/// Split the authorization header into scheme and signature, rejecting anything that is not
/// exactly our scheme with a non-empty signature.
fn parse_authorization_header(value: Option<&str>) -> Result<String, VerificationError> {
    let value = value.map(str::trim).unwrap_or_default();
    let (scheme, signature) =
        value.split_once(' ').ok_or(VerificationError::InvalidAuthorizationHeader)?;
    let signature = signature.trim();
    if scheme != AUTH_SCHEME || signature.is_empty() {
        return Err(VerificationError::InvalidAuthorizationHeader);
    }
    Ok(signature.to_string())
}

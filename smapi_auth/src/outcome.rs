use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::replay::ReplayError;

/// The closed set of reasons a request can fail verification.
///
/// Every failure inside the verifier maps to exactly one of these variants; nothing else
/// propagates to the caller. The messages are deliberately terse — they name the check that
/// failed and nothing more. In particular the expected signature, the stored replay timestamp and
/// any secret-derived value never appear here, in logs, or in response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum VerificationError {
    #[error("Authentication failed for an unknown reason.")]
    FailedForUnknownReason,
    #[error("The API is temporarily unavailable.")]
    ApiUnavailable,
    #[error("The authorization header is missing, malformed, or names an unsupported scheme.")]
    InvalidAuthorizationHeader,
    #[error("The request signature does not match the request.")]
    InvalidSignature,
    #[error("The timestamp header is missing or could not be parsed.")]
    InvalidTimestamp,
    #[error("The request timestamp falls outside of the acceptance window.")]
    TimestampOutOfPeriod,
    #[error("The request timestamp is not later than the last accepted request.")]
    TimestampOlderThanLastRequest,
    #[error("The Content-Md5 header does not match the request body.")]
    ContentMd5NotMatching,
    #[error("No API account exists for the given public key.")]
    UnknownUser,
    #[error("The API account for the given public key has been disabled.")]
    UserDisabled,
    #[error("The API account does not have permission for this request.")]
    UserHasNoPermission,
}

impl VerificationError {
    /// A stable numeric id for each variant, carried in the diagnostic response header so that
    /// clients can switch on failures without parsing prose.
    pub fn result_id(&self) -> u8 {
        use VerificationError::*;
        match self {
            FailedForUnknownReason => 1,
            ApiUnavailable => 2,
            InvalidAuthorizationHeader => 3,
            InvalidSignature => 4,
            InvalidTimestamp => 5,
            TimestampOutOfPeriod => 6,
            TimestampOlderThanLastRequest => 7,
            ContentMd5NotMatching => 8,
            UnknownUser => 9,
            UserDisabled => 10,
            UserHasNoPermission => 11,
        }
    }
}

impl From<ReplayError> for VerificationError {
    fn from(e: ReplayError) -> Self {
        match e {
            ReplayError::OutOfPeriod => VerificationError::TimestampOutOfPeriod,
            ReplayError::NotMonotonic => VerificationError::TimestampOlderThanLastRequest,
        }
    }
}

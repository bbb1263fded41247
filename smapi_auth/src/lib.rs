//! # SmNet Web API authentication engine
//!
//! This library implements the HMAC request-signing protocol used by the SmNet Web API. A client
//! proves its identity and the integrity of a request by signing a canonical representation of the
//! request with a shared secret key; the server rebuilds the same representation from the request
//! it actually received and verifies the signature. The secret key never travels over the wire.
//!
//! The library is transport-agnostic and split along the protocol's seams:
//! * [`keys`] — provisioning of public/secret credential pairs.
//! * [`digest`] — the Content-Md5 body digest.
//! * [`canonical`] — canonical message construction and the timestamp formats.
//! * [`signature`] — HMAC-SHA256 signing and constant-time verification.
//! * [`signer`] — the client role: building the signed header set for an outgoing request.
//! * [`replay`] — per-key replay suppression over an injected shared map.
//! * [`verifier`] — the server role: the full verification state machine.
//!
//! Key lookup is deliberately not part of this crate's job. The server supplies an
//! [`traits::AccountResolver`] implementation over whatever store it keeps its API accounts in;
//! [`memory::InMemoryAccounts`] is provided for small deployments and tests.

pub mod canonical;
pub mod digest;
pub mod headers;
pub mod keys;
pub mod memory;
mod outcome;
pub mod replay;
pub mod signature;
pub mod signer;
pub mod traits;
pub mod verifier;

pub use outcome::VerificationError;
pub use verifier::{AuthenticatedRequest, ReceivedRequest, RequestVerifier, VerifierConfig};

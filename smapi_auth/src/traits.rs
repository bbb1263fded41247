//! The key-lookup seam between the verifier and the account store.
//!
//! How accounts are provisioned, persisted and revoked is a backend concern. The verifier only
//! needs to turn a public key into an [`ApiAccount`] — or learn that none exists. Servers
//! implement [`AccountResolver`] over their own store; [`crate::memory::InMemoryAccounts`] covers
//! small deployments and tests.

use smapi_common::Secret;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Account store error: {0}")]
    StoreError(String),
}

/// One API account as the verifier sees it. The secret key is only ever read for the duration of
/// a signature check; `enabled` is the externally-managed revocation flag.
#[derive(Debug, Clone)]
pub struct ApiAccount {
    pub public_key: String,
    pub secret_key: Secret<String>,
    pub enabled: bool,
}

impl ApiAccount {
    pub fn new(public_key: impl Into<String>, secret_key: Secret<String>) -> Self {
        Self { public_key: public_key.into(), secret_key, enabled: true }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Resolve the account for a public key. `Ok(None)` means no such account; errors mean the store
/// itself is unavailable and are reported to clients as `ApiUnavailable`, never as a lookup miss.
#[allow(async_fn_in_trait)]
pub trait AccountResolver {
    async fn resolve_account(&self, public_key: &str) -> Result<Option<ApiAccount>, AccountApiError>;
}

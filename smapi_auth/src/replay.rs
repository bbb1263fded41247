//! Replay suppression.
//!
//! A signature proves who built a request, not that the request is fresh — nothing stops an
//! eavesdropper from resubmitting a captured request verbatim. The replay guard closes that hole
//! by remembering, per public key, the timestamp of the last accepted request and insisting that
//! every new request be strictly newer.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("The timestamp falls outside of the acceptance window.")]
    OutOfPeriod,
    #[error("The timestamp is not later than the last accepted request.")]
    NotMonotonic,
}

/// The shared backing store for replay state: public key → last accepted timestamp.
///
/// Injected rather than global, so tests get isolated instances and deployments decide what is
/// shared between server workers.
pub type ReplayStore = Arc<DashMap<String, DateTime<Utc>>>;

/// Tracks the last accepted timestamp per public key and enforces the acceptance window.
#[derive(Debug, Clone, Default)]
pub struct ReplayGuard {
    store: ReplayStore,
}

impl ReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: ReplayStore) -> Self {
        Self { store }
    }

    /// Accept or reject a timestamp for the given public key, updating the stored value on
    /// acceptance.
    ///
    /// A timestamp is accepted iff it lies within `[now - window, now + clock_skew]` and is
    /// strictly greater than the last accepted timestamp for this key. The monotonicity check and
    /// the update happen under the map's per-key entry lock, as one operation — two concurrent
    /// replays cannot both read the old value and both pass. Keys are independent; there is no
    /// global lock.
    pub fn check_and_update(
        &self,
        public_key: &str,
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
        window: Duration,
        clock_skew: Duration,
    ) -> Result<(), ReplayError> {
        if timestamp < now - window || timestamp > now + clock_skew {
            return Err(ReplayError::OutOfPeriod);
        }
        match self.store.entry(public_key.to_lowercase()) {
            Entry::Occupied(mut entry) => {
                if timestamp <= *entry.get() {
                    Err(ReplayError::NotMonotonic)
                } else {
                    entry.insert(timestamp);
                    Ok(())
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(timestamp);
                Ok(())
            },
        }
    }
}

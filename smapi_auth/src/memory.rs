//! A fixed, in-memory account store.

use std::{collections::HashMap, sync::Arc};

use crate::traits::{AccountApiError, AccountResolver, ApiAccount};

/// An [`AccountResolver`] over a fixed set of accounts, typically parsed from configuration.
/// Lookups are case-insensitive on the public key. Cheap to clone; all clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccounts {
    accounts: Arc<HashMap<String, ApiAccount>>,
}

impl InMemoryAccounts {
    pub fn new(accounts: impl IntoIterator<Item = ApiAccount>) -> Self {
        let accounts = accounts.into_iter().map(|a| (a.public_key.to_lowercase(), a)).collect();
        Self { accounts: Arc::new(accounts) }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountResolver for InMemoryAccounts {
    async fn resolve_account(&self, public_key: &str) -> Result<Option<ApiAccount>, AccountApiError> {
        Ok(self.accounts.get(&public_key.to_lowercase()).cloned())
    }
}

use mockall::mock;
use smapi_auth::traits::{AccountApiError, AccountResolver, ApiAccount};

mock! {
    pub Accounts {}
    impl AccountResolver for Accounts {
        async fn resolve_account(&self, public_key: &str) -> Result<Option<ApiAccount>, AccountApiError>;
    }
}

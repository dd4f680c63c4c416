use std::sync::Arc;

use crate::database::models::NewAccount;
use crate::database::{DocumentStore, MemoryStore};
use crate::middleware::AuthUser;
use crate::services::{AccountService, TicketService};

/// In-memory fixture for service-level tests
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub tickets: TicketService,
    pub accounts: AccountService,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn DocumentStore> = store.clone();

        Self {
            tickets: TicketService::new(shared.clone()),
            accounts: AccountService::new(shared),
            store,
        }
    }

    /// Insert an account directly, skipping password hashing, and return it as a caller
    pub async fn register(&self, name: &str) -> AuthUser {
        let account = self
            .store
            .create_account(NewAccount {
                name: name.to_string(),
                email: format!("{}@example.com", name),
                password_hash: "unused".to_string(),
            })
            .await
            .expect("create test account");

        AuthUser { user_id: account.id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registered_callers_are_distinct() {
        let ctx = TestContext::new();
        let a = ctx.register("a").await;
        let b = ctx.register("b").await;
        assert_ne!(a, b);
        assert!(ctx.accounts.me(a.user_id).await.is_ok());
    }
}

//! In-memory user directory.
//!
//! Resolves opaque bearer tokens to seeded accounts. Token issuance is
//! somebody else's problem; tests and the dev server seed tokens
//! directly.

use bookery_core::{StoreError, StoreFuture, User, UserDirectory, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    tokens: HashMap<String, UserId>,
}

/// In-memory implementation of [`UserDirectory`].
#[derive(Default)]
pub struct InMemoryUsers {
    inner: RwLock<Inner>,
}

impl InMemoryUsers {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account reachable through the given bearer token.
    pub async fn add(&self, user: User, token: impl Into<String>) {
        let mut inner = self.inner.write().await;
        inner.tokens.insert(token.into(), user.id);
        inner.users.insert(user.id, user);
    }
}

impl UserDirectory for InMemoryUsers {
    fn find_by_token<'a>(
        &'a self,
        token: &'a str,
    ) -> StoreFuture<'a, Result<Option<User>, StoreError>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok(inner
                .tokens
                .get(token)
                .and_then(|id| inner.users.get(id))
                .cloned())
        })
    }

    fn find(&self, id: UserId) -> StoreFuture<'_, Result<Option<User>, StoreError>> {
        Box::pin(async move { Ok(self.inner.read().await.users.get(&id).cloned()) })
    }
}

//! In-memory user repository

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// In-memory user table for development and tests
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `users`
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id(), u)).collect()),
        }
    }

    /// Insert or replace a user
    pub async fn upsert(&self, user: User) {
        self.users.write().await.insert(user.id(), user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_and_require() {
        let repo = InMemoryUserRepository::with_users([User::new(UserId::new(1), "ana", "English")]);

        assert!(repo.get(UserId::new(1)).await.unwrap().is_some());
        assert!(repo.get(UserId::new(2)).await.unwrap().is_none());

        let err = repo.require(UserId::new(2)).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_upsert_replaces_language() {
        let repo = InMemoryUserRepository::new();
        repo.upsert(User::new(UserId::new(1), "ana", "English")).await;
        repo.upsert(User::new(UserId::new(1), "ana", "Português")).await;

        let user = repo.require(UserId::new(1)).await.unwrap();
        assert_eq!(user.prompt_language(), "Português");
    }
}

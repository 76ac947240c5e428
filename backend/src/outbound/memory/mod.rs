//! In-memory credential store.
//!
//! Accounts live in one insertion-ordered `Vec` behind a Tokio `RwLock`.
//! Lookups are linear scans; the store only ever holds a handful of accounts
//! for the lifetime of the process.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{CredentialStore, CredentialStoreError};
use crate::domain::{Email, NewUser, User, UserId, Username};

/// Process-local [`CredentialStore`] adapter.
///
/// # Examples
/// ```
/// use rolegate::domain::ports::CredentialStore;
/// use rolegate::domain::{Email, NewUser, PasswordHash, Role, Username};
/// use rolegate::outbound::InMemoryCredentialStore;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryCredentialStore::new();
/// let user = store
///     .add(NewUser {
///         username: Username::new("ada"),
///         email: Email::new("ada@example.com"),
///         password_hash: PasswordHash::new("$2b$04$..."),
///         role: Role::User,
///     })
///     .await
///     .unwrap();
/// assert_eq!(user.id().get(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, CredentialStoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.email() == email).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, CredentialStoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.username() == username).cloned())
    }

    async fn add(&self, user: NewUser) -> Result<User, CredentialStoreError> {
        // Checks and append share one write guard.
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.username() == &user.username) {
            return Err(CredentialStoreError::duplicate_username(user.username));
        }
        if users.iter().any(|existing| existing.email() == &user.email) {
            return Err(CredentialStoreError::duplicate_email(user.email));
        }

        let id = users
            .iter()
            .map(User::id)
            .max()
            .map_or(UserId::new(1), UserId::next);
        let stored = User::from_new(id, user);
        users.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<User>, CredentialStoreError> {
        Ok(self.users.read().await.clone())
    }
}

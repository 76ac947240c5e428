//! Driven port for account storage.
//!
//! The store owns uniqueness: [`CredentialStore::add`] must check username
//! then email and append in one atomic step so concurrent signups cannot
//! both claim the same name.

use async_trait::async_trait;

use crate::domain::{Email, NewUser, User, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential store adapters.
    pub enum CredentialStoreError {
        /// Another account already uses the username.
        DuplicateUsername { username: String } => "username already registered: {username}",
        /// Another account already uses the email.
        DuplicateEmail { email: String } => "email already registered: {email}",
        /// The backing storage could not serve the request.
        Unavailable { message: String } => "credential store unavailable: {message}",
    }
}

/// Port for looking up and registering accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the account registered under `email`.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, CredentialStoreError>;

    /// Find the account registered under `username`.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, CredentialStoreError>;

    /// Register a new account and return it with its assigned identifier.
    ///
    /// Username uniqueness is checked before email uniqueness.
    async fn add(&self, user: NewUser) -> Result<User, CredentialStoreError>;

    /// Every account in registration order.
    async fn list(&self) -> Result<Vec<User>, CredentialStoreError>;
}

//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only ever see domain use
//! cases, never the adapters behind them.

use std::sync::Arc;

use crate::domain::AccountService;
use crate::domain::ports::{CredentialStore, PasswordHasher};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
}

impl HttpState {
    /// Build state around an existing account service.
    pub fn new(accounts: AccountService) -> Self {
        Self { accounts }
    }

    /// Build state straight from port implementations.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use rolegate::inbound::http::state::HttpState;
    /// use rolegate::outbound::{BcryptPasswordHasher, InMemoryCredentialStore};
    ///
    /// let state = HttpState::from_ports(
    ///     Arc::new(InMemoryCredentialStore::new()),
    ///     Arc::new(BcryptPasswordHasher::default()),
    /// );
    /// let _accounts = state.accounts.clone();
    /// ```
    pub fn from_ports(store: Arc<dyn CredentialStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self::new(AccountService::new(store, hasher))
    }
}

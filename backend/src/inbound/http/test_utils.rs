//! Helpers shared by HTTP unit and integration tests.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::SessionStore};
use actix_web::cookie::Key;
use actix_web::web;

use crate::inbound::http::state::HttpState;
use crate::outbound::hashing::MIN_BCRYPT_COST;
use crate::outbound::{BcryptPasswordHasher, InMemoryCredentialStore, InMemorySessionStore};
use crate::seed::{SeedAccounts, seed_accounts};

/// Session middleware over a fresh in-memory store, with a fresh key and
/// `Secure` disabled so plain-HTTP test requests keep their cookie.
pub fn test_session_middleware() -> SessionMiddleware<InMemorySessionStore> {
    session_middleware_over(InMemorySessionStore::new())
}

/// Same cookie settings as [`test_session_middleware`] over a caller-chosen
/// store, for exercising store failures.
pub fn session_middleware_over<S: SessionStore + 'static>(store: S) -> SessionMiddleware<S> {
    SessionMiddleware::builder(store, Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Hasher at bcrypt's minimum cost.
///
/// # Panics
/// Never in practice; the minimum cost is always accepted.
pub fn fast_hasher() -> BcryptPasswordHasher {
    BcryptPasswordHasher::new(MIN_BCRYPT_COST).expect("minimum bcrypt cost is valid")
}

/// State backed by an empty store and a fast hasher.
pub fn empty_state() -> web::Data<HttpState> {
    web::Data::new(HttpState::from_ports(
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(fast_hasher()),
    ))
}

/// State seeded with the default admin and user accounts.
///
/// # Panics
/// Panics if seeding an empty store fails.
pub async fn seeded_state() -> web::Data<HttpState> {
    let state = empty_state();
    seed_accounts(&state.accounts, &SeedAccounts::default())
        .await
        .expect("seed default accounts");
    state
}

//! Account use cases: signup, login, and the landing page role gate.
//!
//! Handlers talk to [`AccountService`] only; storage and hashing arrive
//! through the [`CredentialStore`] and [`PasswordHasher`] ports.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::ports::{CredentialStore, CredentialStoreError, PasswordHashError, PasswordHasher};
use crate::domain::{Error, LoginCredentials, NewUser, Role, SessionRecord, SignupDetails, User, UserSummary};

/// Message shown when the submitted username already exists.
pub const USERNAME_TAKEN_MESSAGE: &str = "Username is already taken.";
/// Message shown when the submitted email already exists.
pub const EMAIL_TAKEN_MESSAGE: &str = "Email is already registered.";
/// Single message for every failed login so callers cannot probe for accounts.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password.";

/// Signup rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignupError {
    /// Another account already uses the username.
    #[error("{}", USERNAME_TAKEN_MESSAGE)]
    UsernameTaken,
    /// Another account already uses the email; only reported for a free username.
    #[error("{}", EMAIL_TAKEN_MESSAGE)]
    EmailTaken,
    /// Storage or hashing failed; the account was not created.
    #[error(transparent)]
    Internal(#[from] Error),
}

impl From<CredentialStoreError> for SignupError {
    fn from(error: CredentialStoreError) -> Self {
        match error {
            CredentialStoreError::DuplicateUsername { .. } => Self::UsernameTaken,
            CredentialStoreError::DuplicateEmail { .. } => Self::EmailTaken,
            other @ CredentialStoreError::Unavailable { .. } => Self::Internal(store_failure(&other)),
        }
    }
}

impl From<PasswordHashError> for SignupError {
    fn from(error: PasswordHashError) -> Self {
        Self::Internal(hasher_failure(&error))
    }
}

/// Login rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,
    /// Storage or hashing failed while checking the credentials.
    #[error(transparent)]
    Internal(#[from] Error),
}

impl From<CredentialStoreError> for LoginError {
    fn from(error: CredentialStoreError) -> Self {
        Self::Internal(store_failure(&error))
    }
}

impl From<PasswordHashError> for LoginError {
    fn from(error: PasswordHashError) -> Self {
        Self::Internal(hasher_failure(&error))
    }
}

fn store_failure(error: &CredentialStoreError) -> Error {
    warn!(%error, "credential store failure");
    Error::internal(format!("credential store failure: {error}"))
}

fn hasher_failure(error: &PasswordHashError) -> Error {
    warn!(%error, "password hasher failure");
    Error::internal(format!("password hasher failure: {error}"))
}

/// Account use cases shared by all HTTP handlers.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    /// Build the service over a credential store and a password hasher.
    pub fn new(store: Arc<dyn CredentialStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Register a self-service account with the default `user` role.
    ///
    /// Username uniqueness is checked first, then email; the first violation
    /// wins. Nothing is stored unless both checks pass.
    ///
    /// # Errors
    /// [`SignupError::UsernameTaken`] or [`SignupError::EmailTaken`] on a
    /// collision, [`SignupError::Internal`] when storage or hashing fails.
    pub async fn signup(&self, details: &SignupDetails) -> Result<User, SignupError> {
        self.provision(details, Role::User).await
    }

    /// Register an account with an explicit role. Used for startup seeding.
    pub async fn provision(&self, details: &SignupDetails, role: Role) -> Result<User, SignupError> {
        if self.store.find_by_username(details.username()).await?.is_some() {
            debug!(username = %details.username(), "signup rejected: username taken");
            return Err(SignupError::UsernameTaken);
        }
        if self.store.find_by_email(details.email()).await?.is_some() {
            debug!(email = %details.email(), "signup rejected: email taken");
            return Err(SignupError::EmailTaken);
        }

        let password_hash = self.hasher.hash(details.password()).await?;
        // The store re-checks both fields under its write lock, so a
        // concurrent signup that slipped past the checks above still loses.
        let user = self
            .store
            .add(NewUser {
                username: details.username().clone(),
                email: details.email().clone(),
                password_hash,
                role,
            })
            .await?;

        info!(
            user_id = %user.id(),
            username = %user.username(),
            role = %user.role(),
            "account registered"
        );
        Ok(user)
    }

    /// Verify credentials and return the matching account.
    ///
    /// # Errors
    /// [`LoginError::InvalidCredentials`] for an unknown email or a wrong
    /// password, [`LoginError::Internal`] when storage or hashing fails.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, LoginError> {
        let Some(user) = self.store.find_by_email(credentials.email()).await? else {
            debug!("login rejected: unknown email");
            return Err(LoginError::InvalidCredentials);
        };

        if self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await?
        {
            info!(user_id = %user.id(), role = %user.role(), "login succeeded");
            Ok(user)
        } else {
            debug!(user_id = %user.id(), "login rejected: password mismatch");
            Err(LoginError::InvalidCredentials)
        }
    }

    /// Accounts visible to the session holder on the landing page.
    ///
    /// Admins receive every account; everyone else receives `None`.
    pub async fn visible_users(
        &self,
        session: &SessionRecord,
    ) -> Result<Option<Vec<UserSummary>>, Error> {
        if !session.role.is_admin() {
            return Ok(None);
        }
        let users = self
            .store
            .list()
            .await
            .map_err(|error| store_failure(&error))?;
        Ok(Some(users.iter().map(UserSummary::from).collect()))
    }
}

//! Startup provisioning of the built-in admin and user accounts.

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::{AccountService, Role, SignupDetails, SignupError, User};

/// Username of the built-in admin account.
pub const DEFAULT_ADMIN_USERNAME: &str = "AdminUser";
/// Email of the built-in admin account.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
/// Well-known admin password; startup warns while it is in use.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
/// Username of the built-in regular account.
pub const DEFAULT_USER_USERNAME: &str = "RegularUser";
/// Email of the built-in regular account.
pub const DEFAULT_USER_EMAIL: &str = "user@example.com";
/// Well-known regular account password; startup warns while it is in use.
pub const DEFAULT_USER_PASSWORD: &str = "user123";

/// One account to create at startup.
#[derive(Clone)]
pub struct SeedAccount {
    pub username: String,
    pub email: String,
    pub password: Zeroizing<String>,
}

impl SeedAccount {
    /// Build an account from plain values.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    fn details(&self) -> SignupDetails {
        SignupDetails::new(
            self.username.clone(),
            self.email.clone(),
            self.password.as_str(),
        )
    }
}

impl fmt::Debug for SeedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The admin and user accounts provisioned before the listener starts.
#[derive(Debug, Clone)]
pub struct SeedAccounts {
    pub admin: SeedAccount,
    pub user: SeedAccount,
}

impl Default for SeedAccounts {
    fn default() -> Self {
        Self {
            admin: SeedAccount::new(
                DEFAULT_ADMIN_USERNAME,
                DEFAULT_ADMIN_EMAIL,
                DEFAULT_ADMIN_PASSWORD,
            ),
            user: SeedAccount::new(
                DEFAULT_USER_USERNAME,
                DEFAULT_USER_EMAIL,
                DEFAULT_USER_PASSWORD,
            ),
        }
    }
}

impl SeedAccounts {
    /// Whether either account still uses its well-known password.
    pub fn uses_default_passwords(&self) -> bool {
        self.admin.password.as_str() == DEFAULT_ADMIN_PASSWORD
            || self.user.password.as_str() == DEFAULT_USER_PASSWORD
    }
}

/// Errors raised while seeding accounts.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to seed {role} account {username}: {source}")]
    Provision {
        role: Role,
        username: String,
        #[source]
        source: SignupError,
    },
}

/// Create the admin account (id 1) and then the user account (id 2).
///
/// Expects an empty store; a clash with an existing account is an error.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use rolegate::domain::{AccountService, Role};
/// use rolegate::outbound::{BcryptPasswordHasher, InMemoryCredentialStore};
/// use rolegate::seed::{SeedAccounts, seed_accounts};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let service = AccountService::new(
///     Arc::new(InMemoryCredentialStore::new()),
///     Arc::new(BcryptPasswordHasher::new(4).unwrap()),
/// );
/// let seeded = seed_accounts(&service, &SeedAccounts::default()).await.unwrap();
/// assert_eq!(seeded[0].role(), Role::Admin);
/// # });
/// ```
///
/// # Errors
/// Returns [`SeedError::Provision`] naming the account that failed.
pub async fn seed_accounts(
    service: &AccountService,
    accounts: &SeedAccounts,
) -> Result<Vec<User>, SeedError> {
    if accounts.uses_default_passwords() {
        warn!("seeding accounts with default passwords; override them outside development");
    }

    let mut seeded = Vec::with_capacity(2);
    for (account, role) in [(&accounts.admin, Role::Admin), (&accounts.user, Role::User)] {
        let user = service
            .provision(&account.details(), role)
            .await
            .map_err(|source| SeedError::Provision {
                role,
                username: account.username.clone(),
                source,
            })?;
        seeded.push(user);
    }
    info!(count = seeded.len(), "seed accounts provisioned");
    Ok(seeded)
}

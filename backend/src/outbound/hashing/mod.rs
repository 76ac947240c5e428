//! Bcrypt password hasher.
//!
//! Bcrypt is CPU-bound by design, so both hashing and verification run on
//! Tokio's blocking pool instead of an Actix worker.

use async_trait::async_trait;
use tracing::error;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Work factor applied when no override is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;
/// Lowest work factor bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

/// [`PasswordHasher`] backed by the `bcrypt` crate.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Build a hasher with `cost`.
    ///
    /// # Errors
    /// Returns [`PasswordHashError::Hash`] when `cost` lies outside bcrypt's
    /// supported range.
    pub fn new(cost: u32) -> Result<Self, PasswordHashError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(PasswordHashError::hash(format!(
                "bcrypt cost {cost} outside {}..={}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            )));
        }
        Ok(Self { cost })
    }

    /// Configured work factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let cost = self.cost;
        let password = Zeroizing::new(password.to_owned());
        let encoded = tokio::task::spawn_blocking(move || bcrypt::hash(password.as_bytes(), cost))
            .await
            .map_err(|join| {
                error!(error = %join, "bcrypt hashing task failed");
                PasswordHashError::hash(join.to_string())
            })?
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Ok(PasswordHash::new(encoded))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let encoded = hash.as_str().to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(password.as_bytes(), &encoded))
            .await
            .map_err(|join| {
                error!(error = %join, "bcrypt verification task failed");
                PasswordHashError::verify(join.to_string())
            })?
            .map_err(|err| PasswordHashError::verify(err.to_string()))
    }
}

//! Application settings loaded via OrthoConfig.
//!
//! Values come from `ROLEGATE_*` environment variables, matching CLI flags,
//! or a config file, with built-in defaults for anything left unset.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::hashing::DEFAULT_BCRYPT_COST;
use crate::seed::{
    DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME, DEFAULT_USER_EMAIL,
    DEFAULT_USER_PASSWORD, DEFAULT_USER_USERNAME, SeedAccount, SeedAccounts,
};

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 3000);

/// Runtime settings for the server binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROLEGATE")]
pub struct AppSettings {
    /// Listen address.
    pub bind_addr: Option<SocketAddr>,
    /// Bcrypt work factor for new hashes.
    pub bcrypt_cost: Option<u32>,
    /// Start with an empty store instead of the admin/user accounts.
    #[ortho_config(default = false)]
    pub skip_seed: bool,
    /// Admin account username override.
    pub admin_username: Option<String>,
    /// Admin account email override.
    pub admin_email: Option<String>,
    /// Admin account password override.
    pub admin_password: Option<String>,
    /// Regular account username override.
    pub user_username: Option<String>,
    /// Regular account email override.
    pub user_email: Option<String>,
    /// Regular account password override.
    pub user_password: Option<String>,
}

impl AppSettings {
    /// Configured listen address, or `0.0.0.0:3000`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Configured bcrypt cost, or the hasher's default of 10.
    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST)
    }

    /// Seed accounts with configured overrides applied field by field.
    pub fn seed_accounts(&self) -> SeedAccounts {
        fn pick<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
            value.as_deref().unwrap_or(fallback)
        }

        SeedAccounts {
            admin: SeedAccount::new(
                pick(&self.admin_username, DEFAULT_ADMIN_USERNAME),
                pick(&self.admin_email, DEFAULT_ADMIN_EMAIL),
                pick(&self.admin_password, DEFAULT_ADMIN_PASSWORD),
            ),
            user: SeedAccount::new(
                pick(&self.user_username, DEFAULT_USER_USERNAME),
                pick(&self.user_email, DEFAULT_USER_EMAIL),
                pick(&self.user_password, DEFAULT_USER_PASSWORD),
            ),
        }
    }
}

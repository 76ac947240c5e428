//! HTTP inbound adapter: HTML account pages and health probes.

pub mod accounts;
pub mod error;
pub mod health;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod views;

use actix_web::web;

pub use error::ApiResult;

/// Register the account pages. Callers must wrap the scope in a session
/// middleware and provide [`state::HttpState`] as app data.
pub fn configure_accounts(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default().error_handler(|error, _req| accounts::form_rejection(&error)),
    )
    .service(accounts::index)
        .service(accounts::login_form)
        .service(accounts::login)
        .service(accounts::signup_form)
        .service(accounts::signup)
        .service(accounts::landing)
        .service(accounts::logout);
}

/// Register the liveness and readiness probes.
pub fn configure_health(cfg: &mut web::ServiceConfig) {
    cfg.service(health::ready).service(health::live);
}

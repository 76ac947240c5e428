//! Domain primitives, use cases, and ports.
//!
//! Public surface:
//! - [`User`], [`NewUser`], [`UserSummary`] and their field newtypes.
//! - [`LoginCredentials`], [`SignupDetails`], [`SessionRecord`].
//! - [`AccountService`]: signup, login, and the landing page role gate.
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failures.
//! - [`ports`]: traits implemented by outbound adapters.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::accounts::{
    AccountService, EMAIL_TAKEN_MESSAGE, INVALID_CREDENTIALS_MESSAGE, LoginError, SignupError,
    USERNAME_TAKEN_MESSAGE,
};
pub use self::auth::{LoginCredentials, SessionRecord, SignupDetails};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::TraceId;
pub use self::user::{Email, NewUser, PasswordHash, Role, User, UserId, UserSummary, Username};

/// Header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

//! Authentication primitives: submitted credentials and the session record.
//!
//! Plaintext passwords are held in [`Zeroizing`] buffers so they are wiped
//! once a request finishes with them.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::{Email, Role, User, Username};

/// Credentials submitted to the login form.
///
/// # Examples
/// ```
/// use rolegate::domain::LoginCredentials;
///
/// let creds = LoginCredentials::new("admin@example.com", "admin123");
/// assert_eq!(creds.email().as_ref(), "admin@example.com");
/// assert_eq!(creds.password(), "admin123");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Capture the submitted email and password verbatim.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Email::new(email),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plaintext password as submitted.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Account details submitted to the signup form.
///
/// Nothing beyond uniqueness is checked; empty or weak values are accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct SignupDetails {
    username: Username,
    email: Email,
    password: Zeroizing<String>,
}

impl SignupDetails {
    /// Capture the submitted fields verbatim.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: Username::new(username),
            email: Email::new(email),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Requested username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Requested email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plaintext password, hashed before storage.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for SignupDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupDetails")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authenticated identity kept in the server-side session.
///
/// Carries exactly what the pages need: who is logged in, how to greet them,
/// and which role gate applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Name shown in the landing page greeting.
    pub username: Username,
    /// Decides whether the account list is shown.
    pub role: Role,
    pub email: Email,
}

impl From<&User> for SessionRecord {
    fn from(user: &User) -> Self {
        Self {
            username: user.username().clone(),
            role: user.role(),
            email: user.email().clone(),
        }
    }
}

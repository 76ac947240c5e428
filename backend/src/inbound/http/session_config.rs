//! Cookie session settings read from the environment.
//!
//! Debug builds tolerate missing or malformed toggles, logging a warning and
//! falling back to a default. Release builds require every toggle explicitly
//! and refuse short or missing key files.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

/// Path to the file holding the cookie key material.
pub const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
/// `1|0|true|false|yes|no`: mark the cookie `Secure`.
pub const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
/// `Strict|Lax|None`.
pub const SAMESITE_ENV: &str = "SESSION_SAMESITE";
/// Permit a generated key when the key file is unreadable.
pub const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
/// Minimum key file length accepted in release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;
// `Key::derive_from` panics below this length.
const KEY_DERIVE_MIN_LEN: usize = 32;
const FINGERPRINT_BYTES: usize = 8;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// How strictly session toggles are validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Defaults with warnings.
    Debug,
    /// Explicit values only.
    Release,
}

impl BuildMode {
    /// Mode matching the current compilation profile.
    ///
    /// ```
    /// use rolegate::inbound::http::session_config::BuildMode;
    ///
    /// let expected = if cfg!(debug_assertions) { BuildMode::Debug } else { BuildMode::Release };
    /// assert_eq!(BuildMode::from_debug_assertions(), expected);
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }

    /// Resolve a toggle: `parsed` when present and valid, otherwise the
    /// debug fallback or a release error.
    fn resolve<T>(
        self,
        name: &'static str,
        raw: Option<String>,
        parse: impl FnOnce(&str) -> Option<T>,
        fallback: T,
        expected: &'static str,
    ) -> Result<T, SessionConfigError> {
        match raw {
            Some(value) => match parse(&value) {
                Some(parsed) => Ok(parsed),
                None if self.is_debug() => {
                    warn!(variable = name, value = %value, "invalid session toggle; using default");
                    Ok(fallback)
                }
                None => Err(SessionConfigError::InvalidEnv {
                    name,
                    value,
                    expected,
                }),
            },
            None if self.is_debug() => {
                warn!(variable = name, "session toggle not set; using default");
                Ok(fallback)
            }
            None => Err(SessionConfigError::MissingEnv { name }),
        }
    }
}

/// Validated cookie session settings.
pub struct SessionSettings {
    /// Key used to encrypt and sign session cookies.
    pub key: Key,
    /// Whether the cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// `SameSite` policy for the cookie.
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Short fingerprint of the active key, safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        key_fingerprint(&self.key)
    }
}

/// Session configuration failures.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A release build left a required variable unset.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable holds a value outside its accepted set.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Value as read.
        value: String,
        /// Accepted values, for the message.
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Key file location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The key file holds fewer bytes than the build mode demands.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file location.
        path: PathBuf,
        /// Bytes found.
        length: usize,
        /// Bytes required.
        min_len: usize,
    },
    /// Browsers reject `SameSite=None` cookies without `Secure`.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds never run on a throwaway key.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Read and validate session settings from `env`.
///
/// # Examples
/// ```
/// use mockable::MockEnv;
/// use rolegate::inbound::http::session_config::{session_settings_from_env, BuildMode};
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "SESSION_KEY_FILE" => Some("/nonexistent/rolegate-key".to_owned()),
///     _ => None,
/// });
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie_secure);
/// ```
///
/// # Errors
/// Release builds fail on any missing or invalid toggle, an unreadable key
/// file, or a key shorter than [`SESSION_KEY_MIN_LEN`].
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = mode.resolve(
        COOKIE_SECURE_ENV,
        env.string(COOKIE_SECURE_ENV),
        parse_bool,
        true,
        BOOL_EXPECTED,
    )?;
    let same_site = same_site(env, mode, cookie_secure)?;
    let allow_ephemeral = mode.resolve(
        ALLOW_EPHEMERAL_ENV,
        env.string(ALLOW_EPHEMERAL_ENV),
        parse_bool,
        false,
        BOOL_EXPECTED,
    )?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );
    let key = load_key(path, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn same_site<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let fallback = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let same_site = mode.resolve(
        SAMESITE_ENV,
        env.string(SAMESITE_ENV),
        parse_same_site,
        fallback,
        SAMESITE_EXPECTED,
    )?;
    if same_site == SameSite::None && !cookie_secure {
        if !mode.is_debug() {
            return Err(SessionConfigError::InsecureSameSiteNone);
        }
        warn!("SameSite=None without Secure; browsers may drop the session cookie");
    }
    Ok(same_site)
}

fn load_key(path: PathBuf, mode: BuildMode, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if !mode.is_debug() && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            if length < KEY_DERIVE_MIN_LEN {
                bytes.zeroize();
                warn!(path = %path.display(), length, "session key too short to derive; using temporary key");
                return Ok(Key::generate());
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(path = %path.display(), %error, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "lax" => Some(SameSite::Lax),
        "strict" => Some(SameSite::Strict),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

/// First eight bytes of the SHA-256 of the key's signing half, hex encoded.
///
/// ```
/// use actix_web::cookie::Key;
/// use rolegate::inbound::http::session_config::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;
    use rstest_bdd_macros::{given, then, when};
    use std::collections::HashMap;
    use uuid::Uuid;

    struct TempKeyFile(PathBuf);

    impl TempKeyFile {
        fn new(len: usize) -> Self {
            let path = std::env::temp_dir().join(format!("rolegate-key-{}", Uuid::new_v4()));
            std::fs::write(&path, vec![b'k'; len]).expect("write key file");
            Self(path)
        }

        fn path_str(&self) -> String {
            self.0.to_str().expect("utf8 temp path").to_owned()
        }
    }

    impl Drop for TempKeyFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |name| vars.get(name).cloned());
        env
    }

    fn release_vars(key: &TempKeyFile) -> HashMap<&'static str, String> {
        HashMap::from([
            (KEY_FILE_ENV, key.path_str()),
            (COOKIE_SECURE_ENV, "1".to_owned()),
            (SAMESITE_ENV, "Strict".to_owned()),
            (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
        ])
    }

    #[given("a complete release environment")]
    fn a_complete_release_environment(key: &TempKeyFile) -> HashMap<&'static str, String> {
        release_vars(key)
    }

    #[when("the session configuration is loaded")]
    fn the_session_configuration_is_loaded(
        vars: HashMap<&'static str, String>,
        mode: BuildMode,
    ) -> Result<SessionSettings, SessionConfigError> {
        session_settings_from_env(&mock_env(vars), mode)
    }

    #[then("secure strict settings are returned")]
    fn secure_strict_settings_are_returned(result: &Result<SessionSettings, SessionConfigError>) {
        let settings = result.as_ref().expect("release settings");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
    }

    #[rstest]
    fn release_accepts_explicit_settings() {
        let key = TempKeyFile::new(SESSION_KEY_MIN_LEN);
        let vars = a_complete_release_environment(&key);
        let result = the_session_configuration_is_loaded(vars, BuildMode::Release);
        secure_strict_settings_are_returned(&result);
    }

    #[rstest]
    #[case(COOKIE_SECURE_ENV)]
    #[case(SAMESITE_ENV)]
    #[case(ALLOW_EPHEMERAL_ENV)]
    fn release_requires_each_toggle(#[case] missing: &'static str) {
        let key = TempKeyFile::new(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.remove(missing);
        let err = the_session_configuration_is_loaded(vars, BuildMode::Release)
            .err()
            .expect("missing toggle");
        assert!(matches!(err, SessionConfigError::MissingEnv { name } if name == missing));
    }

    #[rstest]
    fn release_rejects_short_key() {
        let key = TempKeyFile::new(SESSION_KEY_MIN_LEN - 1);
        let err = session_settings_from_env(&mock_env(release_vars(&key)), BuildMode::Release)
            .err()
            .expect("short key");
        assert!(matches!(err, SessionConfigError::KeyTooShort { length: 63, .. }));
    }

    #[rstest]
    fn release_rejects_ephemeral_keys() {
        let key = TempKeyFile::new(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("ephemeral rejected");
        assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
    }

    #[rstest]
    fn release_rejects_insecure_same_site_none() {
        let key = TempKeyFile::new(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
        vars.insert(SAMESITE_ENV, "None".to_owned());
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("insecure none");
        assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
    }

    #[rstest]
    fn release_rejects_unparseable_toggle() {
        let key = TempKeyFile::new(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.insert(COOKIE_SECURE_ENV, "maybe".to_owned());
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("invalid toggle");
        assert!(matches!(
            err,
            SessionConfigError::InvalidEnv { name: COOKIE_SECURE_ENV, .. }
        ));
    }

    #[rstest]
    fn release_fails_without_key_file() {
        let mut vars = HashMap::from([
            (COOKIE_SECURE_ENV, "1".to_owned()),
            (SAMESITE_ENV, "Lax".to_owned()),
            (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
        ]);
        vars.insert(KEY_FILE_ENV, format!("/nonexistent/{}", Uuid::new_v4()));
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("unreadable key");
        assert!(matches!(err, SessionConfigError::KeyRead { .. }));
    }

    #[rstest]
    fn debug_falls_back_on_garbage() {
        let vars = HashMap::from([
            (KEY_FILE_ENV, format!("/nonexistent/{}", Uuid::new_v4())),
            (COOKIE_SECURE_ENV, "sometimes".to_owned()),
            (SAMESITE_ENV, "sideways".to_owned()),
        ]);
        let settings =
            session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug defaults");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Lax);
    }

    #[rstest]
    fn debug_short_key_is_accepted_and_deterministic() {
        let key = TempKeyFile::new(KEY_DERIVE_MIN_LEN);
        let vars = HashMap::from([(KEY_FILE_ENV, key.path_str())]);
        let first = session_settings_from_env(&mock_env(vars.clone()), BuildMode::Debug)
            .expect("first load");
        let second =
            session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("second load");
        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[rstest]
    #[case("TRUE", Some(true))]
    #[case("n", Some(false))]
    #[case("2", None)]
    fn parses_bool_toggles(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(raw), expected);
    }

    #[rstest]
    fn fingerprints_differ_between_keys() {
        assert_ne!(
            key_fingerprint(&Key::derive_from(&[b'a'; 64])),
            key_fingerprint(&Key::derive_from(&[b'b'; 64]))
        );
    }
}

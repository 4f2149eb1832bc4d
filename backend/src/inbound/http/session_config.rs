//! Session cookie configuration.
//!
//! The encrypted session cookie carries the username a refresh token was
//! issued for. Its key, flags and lifetime come from the environment and are
//! validated strictly in release builds and leniently (with warnings) in
//! debug builds.

mod key;
mod parsing;

pub use key::key_fingerprint;

use std::path::PathBuf;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite, time::Duration};
use mockable::Env;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "session";
/// Default session lifetime: seven days, matching the refresh token.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const TTL_ENV: &str = "SESSION_TTL_HOURS";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Defaults are tolerated and reported as warnings.
    Debug,
    /// Toggles must be present and valid.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// ```
    /// use recordkeeper::inbound::http::session_config::BuildMode;
    ///
    /// let expected = if cfg!(debug_assertions) { BuildMode::Debug } else { BuildMode::Release };
    /// assert_eq!(BuildMode::from_debug_assertions(), expected);
    /// ```
    #[must_use]
    pub const fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A variable required in release builds is unset.
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
        /// Value as found.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Key file location.
        path: PathBuf,
        /// Read failure.
        #[source]
        source: std::io::Error,
    },
    /// The key file holds fewer bytes than a cookie key needs.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file location.
        path: PathBuf,
        /// Bytes found.
        length: usize,
        /// Bytes required.
        min_len: usize,
    },
    /// `SameSite=None` cookies must also be `Secure`.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
}

/// Validated session cookie settings.
#[derive(Clone)]
pub struct SessionSettings {
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
    ttl_hours: i64,
}

impl SessionSettings {
    /// Settings with a freshly generated key, `SameSite=Lax` and the default
    /// lifetime. Sessions do not survive a restart.
    ///
    /// ```
    /// use recordkeeper::inbound::http::session_config::SessionSettings;
    ///
    /// let settings = SessionSettings::ephemeral(false);
    /// assert!(!settings.cookie_secure());
    /// assert_eq!(settings.key_fingerprint().len(), 16);
    /// ```
    #[must_use]
    pub fn ephemeral(cookie_secure: bool) -> Self {
        Self {
            key: Key::generate(),
            cookie_secure,
            same_site: SameSite::Lax,
            ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }

    /// Whether cookies carry the `Secure` flag.
    #[must_use]
    pub const fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// `SameSite` policy for the cookie.
    #[must_use]
    pub const fn same_site(&self) -> SameSite {
        self.same_site
    }

    /// Cookie lifetime in hours.
    #[must_use]
    pub const fn ttl_hours(&self) -> i64 {
        self.ttl_hours
    }

    /// Short fingerprint of the active key for startup logs.
    #[must_use]
    pub fn key_fingerprint(&self) -> String {
        key_fingerprint(&self.key)
    }

    /// Cookie session middleware: encrypted, http-only, persistent for the
    /// configured lifetime.
    #[must_use]
    pub fn middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name(SESSION_COOKIE_NAME.to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(self.cookie_secure)
            .cookie_http_only(true)
            .cookie_content_security(CookieContentSecurity::Private)
            .cookie_same_site(self.same_site)
            .session_lifecycle(
                PersistentSession::default().session_ttl(Duration::hours(self.ttl_hours)),
            )
            .build()
    }
}

/// Build session settings from environment variables and build mode.
///
/// ```
/// use mockable::MockEnv;
/// use recordkeeper::inbound::http::session_config::{BuildMode, session_settings_from_env};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("recordkeeper_session_key_example");
/// std::fs::write(&key_path, vec![b'k'; 64])?;
/// let key_file = key_path.to_string_lossy().into_owned();
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "SESSION_KEY_FILE" => Some(key_file.clone()),
///     "SESSION_COOKIE_SECURE" => Some("1".to_owned()),
///     "SESSION_SAMESITE" => Some("Strict".to_owned()),
///     _ => None,
/// });
///
/// let settings = session_settings_from_env(&env, BuildMode::Release)?;
/// assert!(settings.cookie_secure());
/// assert_eq!(settings.ttl_hours(), 168);
///
/// std::fs::remove_file(&key_path)?;
/// # Ok(())
/// # }
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = parsing::required_bool(env, mode, COOKIE_SECURE_ENV, true)?;
    let same_site = parsing::same_site(env, mode, cookie_secure)?;
    let allow_ephemeral = parsing::optional_bool(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
    let ttl_hours = parsing::ttl_hours(env, mode)?;
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );
    let key = key::load(&path, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
        ttl_hours,
    })
}

//! Environment toggle parsing.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

use super::{
    BuildMode, DEFAULT_SESSION_TTL_HOURS, SAMESITE_ENV, SessionConfigError, TTL_ENV,
};

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const TTL_EXPECTED: &str = "a positive number of hours";

/// Fall back with a warning in debug builds; fail in release builds.
fn lenient<T>(mode: BuildMode, fallback: T, error: SessionConfigError) -> Result<T, SessionConfigError> {
    if mode.is_debug() {
        warn!(error = %error, "session setting defaulted");
        Ok(fallback)
    } else {
        Err(error)
    }
}

fn invalid(name: &'static str, value: String, expected: &'static str) -> SessionConfigError {
    SessionConfigError::InvalidEnv {
        name,
        value,
        expected,
    }
}

/// A boolean that release builds must set explicitly.
pub(super) fn required_bool<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    default: bool,
) -> Result<bool, SessionConfigError> {
    env.string(name).map_or_else(
        || lenient(mode, default, SessionConfigError::MissingEnv { name }),
        |value| flag(mode, name, default, value),
    )
}

/// A boolean that may be omitted in any build.
pub(super) fn optional_bool<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    default: bool,
) -> Result<bool, SessionConfigError> {
    env.string(name)
        .map_or(Ok(default), |value| flag(mode, name, default, value))
}

fn flag(
    mode: BuildMode,
    name: &'static str,
    default: bool,
    value: String,
) -> Result<bool, SessionConfigError> {
    parse_bool(&value).map_or_else(
        || lenient(mode, default, invalid(name, value, BOOL_EXPECTED)),
        Ok,
    )
}

pub(super) fn same_site<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = env.string(SAMESITE_ENV) else {
        return lenient(mode, default, SessionConfigError::MissingEnv { name: SAMESITE_ENV });
    };
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => lenient(mode, SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => lenient(mode, default, invalid(SAMESITE_ENV, value, SAMESITE_EXPECTED)),
    }
}

pub(super) fn ttl_hours<E: Env>(env: &E, mode: BuildMode) -> Result<i64, SessionConfigError> {
    let Some(value) = env.string(TTL_ENV) else {
        return Ok(DEFAULT_SESSION_TTL_HOURS);
    };
    match value.trim().parse::<i64>() {
        Ok(hours) if hours > 0 => Ok(hours),
        _ => lenient(
            mode,
            DEFAULT_SESSION_TTL_HOURS,
            invalid(TTL_ENV, value, TTL_EXPECTED),
        ),
    }
}

pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

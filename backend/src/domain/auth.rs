//! Authentication primitives: credentials, registrations and login context.
//!
//! Inbound adapters parse raw payloads through these constructors before
//! calling a driving port, so the services only ever see validated values.

use zeroize::Zeroizing;

use crate::domain::user::{EmailAddress, UserValidationError};

/// Message returned whenever an email or password is missing.
pub const CREDENTIALS_REQUIRED: &str = "Email and password are required";

/// Domain error returned when login or registration payloads are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email was present but malformed.
    #[error("email is invalid: {0}")]
    InvalidEmail(UserValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is normalised (see [`EmailAddress`]).
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use recordkeeper::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "pw").expect("valid");
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        if email.trim().is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        let normalised = EmailAddress::new(email).map_err(LoginValidationError::InvalidEmail)?;
        Ok(Self {
            email: normalised,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the user lookup.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    first_name: Option<String>,
    last_name: Option<String>,
    credentials: LoginCredentials,
}

impl Registration {
    /// Build a registration; blank names are treated as absent.
    pub fn try_from_parts(
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<Self, LoginValidationError> {
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        Ok(Self {
            first_name: non_blank(first_name),
            last_name: non_blank(last_name),
            credentials,
        })
    }

    /// Trimmed first name, if one was given.
    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    /// Trimmed last name, if one was given.
    #[must_use]
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// Email and password of the new account.
    #[must_use]
    pub const fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Request metadata stored alongside a refresh token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginContext {
    /// Client address as seen by the server.
    pub ip_address: Option<String>,
    /// `User-Agent` header of the login request.
    pub user_agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("ada@example.com", "", LoginValidationError::EmptyPassword)]
    #[case(
        "ada",
        "pw",
        LoginValidationError::InvalidEmail(UserValidationError::MalformedEmail)
    )]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn password_whitespace_is_preserved() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", " pw ")
            .expect("valid inputs");
        assert_eq!(creds.password(), " pw ");
    }

    #[rstest]
    fn blank_names_become_absent() {
        let reg = Registration::try_from_parts(Some("  "), Some(" Lovelace "), "a@b.c", "pw")
            .expect("valid registration");
        assert_eq!(reg.first_name(), None);
        assert_eq!(reg.last_name(), Some("Lovelace"));
    }
}

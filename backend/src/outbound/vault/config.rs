//! Vault connection settings.

use std::fmt;
use std::time::Duration;

use url::Url;
use zeroize::Zeroizing;

/// Address used when none is configured.
pub const DEFAULT_VAULT_ADDRESS: &str = "http://localhost:8200";
/// KV v2 data path holding one secret per username.
pub const DEFAULT_KV_PATH: &str = "secret/data/jwt-tokens";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while validating Vault settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultConfigError {
    /// Neither a token nor a complete AppRole pair was given.
    #[error("either a vault token or both role id and secret id must be provided")]
    MissingCredentials,
    /// The address is not a URL.
    #[error("invalid vault address {address}: {message}")]
    InvalidAddress {
        /// Address as configured.
        address: String,
        /// Parser complaint.
        message: String,
    },
    /// The KV path is not a KV v2 data path.
    #[error("kv path must point at a KV v2 data path (contain /data/)")]
    InvalidKvPath,
}

/// How the client obtains a Vault token.
#[derive(Clone)]
pub enum VaultAuth {
    /// Fixed token, typically a development root token.
    Token(Zeroizing<String>),
    /// AppRole login yielding leased tokens.
    AppRole {
        /// Role identifier.
        role_id: String,
        /// Secret paired with the role.
        secret_id: Zeroizing<String>,
    },
}

impl fmt::Debug for VaultAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(<redacted>)"),
            Self::AppRole { role_id, .. } => f
                .debug_struct("AppRole")
                .field("role_id", role_id)
                .field("secret_id", &"<redacted>")
                .finish(),
        }
    }
}

impl VaultAuth {
    /// Pick an auth method from optional settings. A direct token wins over
    /// AppRole credentials.
    pub fn from_parts(
        token: Option<String>,
        role_id: Option<String>,
        secret_id: Option<String>,
    ) -> Result<Self, VaultConfigError> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        if let Some(fixed) = present(token) {
            return Ok(Self::Token(Zeroizing::new(fixed)));
        }
        match (present(role_id), present(secret_id)) {
            (Some(role), Some(secret)) => Ok(Self::AppRole {
                role_id: role,
                secret_id: Zeroizing::new(secret),
            }),
            _ => Err(VaultConfigError::MissingCredentials),
        }
    }
}

/// Validated Vault client configuration.
///
/// ```
/// use recordkeeper::outbound::vault::{VaultAuth, VaultConfig};
///
/// let auth = VaultAuth::from_parts(Some("dev-root".into()), None, None).unwrap();
/// let config = VaultConfig::new(None, None, auth).unwrap();
/// assert_eq!(config.kv_path(), "secret/data/jwt-tokens");
/// assert_eq!(config.metadata_path(), "secret/metadata/jwt-tokens");
/// ```
#[derive(Debug, Clone)]
pub struct VaultConfig {
    address: String,
    kv_path: String,
    auth: VaultAuth,
    timeout: Duration,
}

impl VaultConfig {
    /// Validate the address and KV path, falling back to the defaults.
    pub fn new(
        address: Option<String>,
        kv_path: Option<String>,
        auth: VaultAuth,
    ) -> Result<Self, VaultConfigError> {
        let base = address.unwrap_or_else(|| DEFAULT_VAULT_ADDRESS.to_owned());
        Url::parse(&base).map_err(|err| VaultConfigError::InvalidAddress {
            address: base.clone(),
            message: err.to_string(),
        })?;
        let path = kv_path
            .unwrap_or_else(|| DEFAULT_KV_PATH.to_owned())
            .trim_matches('/')
            .to_owned();
        if !path.contains("/data/") {
            return Err(VaultConfigError::InvalidKvPath);
        }
        Ok(Self {
            address: base.trim_end_matches('/').to_owned(),
            kv_path: path,
            auth,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// KV v2 data path.
    #[must_use]
    pub fn kv_path(&self) -> &str {
        &self.kv_path
    }

    /// Metadata path matching the KV data path, used for listing.
    #[must_use]
    pub fn metadata_path(&self) -> String {
        self.kv_path.replacen("/data/", "/metadata/", 1)
    }

    /// Configured auth method.
    #[must_use]
    pub const fn auth(&self) -> &VaultAuth {
        &self.auth
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, Some("role"), None)]
    #[case(None, None, Some("secret"))]
    #[case(Some("  "), None, None)]
    fn incomplete_credentials_are_rejected(
        #[case] token: Option<&str>,
        #[case] role_id: Option<&str>,
        #[case] secret_id: Option<&str>,
    ) {
        let err = VaultAuth::from_parts(
            token.map(str::to_owned),
            role_id.map(str::to_owned),
            secret_id.map(str::to_owned),
        )
        .expect_err("credentials incomplete");
        assert_eq!(err, VaultConfigError::MissingCredentials);
    }

    #[rstest]
    fn direct_token_wins_over_approle() {
        let auth = VaultAuth::from_parts(
            Some("root".into()),
            Some("role".into()),
            Some("secret".into()),
        )
        .expect("auth");
        assert!(matches!(auth, VaultAuth::Token(_)));
    }

    #[rstest]
    fn debug_output_redacts_secrets() {
        let auth = VaultAuth::from_parts(None, Some("role".into()), Some("s3cr3t".into()))
            .expect("auth");
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("role"));
        assert!(!rendered.contains("s3cr3t"));
    }

    #[rstest]
    #[case(Some("not a url"), None)]
    #[case(None, Some("secret/jwt-tokens"))]
    fn malformed_locations_are_rejected(
        #[case] address: Option<&str>,
        #[case] kv_path: Option<&str>,
    ) {
        let auth = VaultAuth::from_parts(Some("root".into()), None, None).expect("auth");
        assert!(
            VaultConfig::new(address.map(str::to_owned), kv_path.map(str::to_owned), auth)
                .is_err()
        );
    }

    #[rstest]
    fn trailing_slashes_are_trimmed() {
        let auth = VaultAuth::from_parts(Some("root".into()), None, None).expect("auth");
        let config = VaultConfig::new(
            Some("https://vault.internal:8200/".into()),
            Some("/kv/data/tokens/".into()),
            auth,
        )
        .expect("config");
        assert_eq!(config.address(), "https://vault.internal:8200");
        assert_eq!(config.kv_path(), "kv/data/tokens");
        assert_eq!(config.metadata_path(), "kv/metadata/tokens");
    }
}

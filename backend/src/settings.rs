//! Application settings loaded via OrthoConfig.
//!
//! Every field can be set through an `APP_`-prefixed environment variable
//! (for example `APP_MONGODB_URI`), a configuration file or the command
//! line. Unset infrastructure settings select in-memory adapters.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;

use crate::domain::TokenSecrets;
use crate::inbound::http::session_config::BuildMode;
use crate::outbound::vault::{
    DEFAULT_CLEANUP_INTERVAL, DEFAULT_MAX_TOKEN_AGE_HOURS, VaultAuth, VaultConfig,
    VaultConfigError,
};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MONGODB_DATABASE: &str = "recordkeeper";
const DEFAULT_CLIENT_DIR: &str = "build/client";
const DEFAULT_ASSETS_DIR: &str = "assets";
const STATS_FILE: &str = "stats.json";
const DEV_ACCESS_SECRET: &str = "dev-access-secret";
const DEV_REFRESH_SECRET: &str = "dev-refresh-secret";

/// Errors raised while interpreting settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A signing secret is unset in a release build.
    #[error("{name} must be set in release builds")]
    MissingSecret {
        /// Environment variable that must be set.
        name: &'static str,
    },
    /// A release build was given the development signing secret.
    #[error("{name} uses the development default; set a real secret")]
    DefaultSecret {
        /// Environment variable holding the default.
        name: &'static str,
    },
    /// The Vault settings do not form a usable client configuration.
    #[error("invalid vault settings: {0}")]
    Vault(#[from] VaultConfigError),
    /// An hour-based period was zero or negative.
    #[error("{name} must be a positive number of hours")]
    NonPositiveHours {
        /// Environment variable carrying the value.
        name: &'static str,
    },
}

/// Runtime configuration for the server binary.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APP")]
pub struct AppSettings {
    /// Interface to bind; defaults to all interfaces.
    pub host: Option<IpAddr>,
    /// Port to bind; defaults to 3000.
    pub port: Option<u16>,
    /// PostgreSQL URL for users.
    pub database_url: Option<String>,
    /// MongoDB URI for records.
    pub mongodb_uri: Option<String>,
    /// MongoDB database name; defaults to `recordkeeper`.
    pub mongodb_database: Option<String>,
    /// Secret signing access tokens.
    pub jwt_access_secret: Option<String>,
    /// Secret signing refresh tokens.
    pub jwt_refresh_secret: Option<String>,
    /// Vault server address. Vault is used when any Vault credential is set.
    pub vault_addr: Option<String>,
    /// Fixed Vault token, used instead of AppRole.
    pub vault_token: Option<String>,
    /// AppRole role id.
    pub vault_role_id: Option<String>,
    /// AppRole secret id.
    pub vault_secret_id: Option<String>,
    /// KV v2 path holding refresh tokens.
    pub vault_kv_path: Option<String>,
    /// Hours between refresh token cleanup sweeps.
    pub token_cleanup_interval_hours: Option<u64>,
    /// Refresh tokens unused for longer than this are removed.
    pub token_max_age_hours: Option<i64>,
    /// Directory holding the client bundle and its stats file.
    pub client_dir: Option<PathBuf>,
    /// Directory of static assets served under `/assets`.
    pub assets_dir: Option<PathBuf>,
    /// Serve production markup (no source maps).
    #[ortho_config(default = false)]
    #[serde(default)]
    pub production: bool,
    /// bcrypt cost for new password hashes.
    pub bcrypt_cost: Option<u32>,
}

impl AppSettings {
    /// Socket address the server binds.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// MongoDB database name.
    #[must_use]
    pub fn mongodb_database(&self) -> &str {
        self.mongodb_database
            .as_deref()
            .unwrap_or(DEFAULT_MONGODB_DATABASE)
    }

    /// Directory holding the client bundle.
    #[must_use]
    pub fn client_dir(&self) -> PathBuf {
        self.client_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLIENT_DIR))
    }

    /// Path of the bundle's stats file.
    #[must_use]
    pub fn client_stats_path(&self) -> PathBuf {
        self.client_dir().join(STATS_FILE)
    }

    /// Directory of static assets.
    #[must_use]
    pub fn assets_dir(&self) -> PathBuf {
        self.assets_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR))
    }

    /// Period between cleanup sweeps. A zero period is rejected because the
    /// sweep timer cannot tick on it.
    pub fn cleanup_interval(&self) -> Result<Duration, SettingsError> {
        match self.token_cleanup_interval_hours {
            None => Ok(DEFAULT_CLEANUP_INTERVAL),
            Some(0) => Err(SettingsError::NonPositiveHours {
                name: "APP_TOKEN_CLEANUP_INTERVAL_HOURS",
            }),
            Some(hours) => Ok(Duration::from_secs(hours.saturating_mul(60 * 60))),
        }
    }

    /// Age after which unused refresh tokens are swept.
    pub fn token_max_age_hours(&self) -> Result<i64, SettingsError> {
        match self.token_max_age_hours {
            None => Ok(DEFAULT_MAX_TOKEN_AGE_HOURS),
            Some(hours) if hours > 0 => Ok(hours),
            Some(_) => Err(SettingsError::NonPositiveHours {
                name: "APP_TOKEN_MAX_AGE_HOURS",
            }),
        }
    }

    /// JWT signing secrets. Debug builds fall back to development secrets;
    /// release builds require real ones.
    pub fn token_secrets(&self, mode: BuildMode) -> Result<TokenSecrets, SettingsError> {
        let access = secret(
            self.jwt_access_secret.as_deref(),
            "APP_JWT_ACCESS_SECRET",
            DEV_ACCESS_SECRET,
            mode,
        )?;
        let refresh = secret(
            self.jwt_refresh_secret.as_deref(),
            "APP_JWT_REFRESH_SECRET",
            DEV_REFRESH_SECRET,
            mode,
        )?;
        Ok(TokenSecrets::new(access, refresh))
    }

    /// Vault configuration when any Vault credential is present.
    pub fn vault(&self) -> Result<Option<VaultConfig>, SettingsError> {
        let configured = [&self.vault_token, &self.vault_role_id, &self.vault_secret_id]
            .into_iter()
            .any(|value| value.as_deref().is_some_and(|v| !v.trim().is_empty()));
        if !configured {
            return Ok(None);
        }
        let auth = VaultAuth::from_parts(
            self.vault_token.clone(),
            self.vault_role_id.clone(),
            self.vault_secret_id.clone(),
        )?;
        let config = VaultConfig::new(self.vault_addr.clone(), self.vault_kv_path.clone(), auth)?;
        Ok(Some(config))
    }
}

fn secret<'a>(
    value: Option<&'a str>,
    name: &'static str,
    dev_default: &'a str,
    mode: BuildMode,
) -> Result<&'a str, SettingsError> {
    match (value.filter(|v| !v.trim().is_empty()), mode) {
        (Some(v), BuildMode::Release) if v == dev_default => {
            Err(SettingsError::DefaultSecret { name })
        }
        (Some(v), _) => Ok(v),
        (None, BuildMode::Debug) => {
            warn!(variable = name, "using development JWT secret");
            Ok(dev_default)
        }
        (None, BuildMode::Release) => Err(SettingsError::MissingSecret { name }),
    }
}

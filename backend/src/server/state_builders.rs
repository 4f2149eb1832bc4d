//! Adapter selection and HTTP state assembly.
//!
//! Each datastore is optional: without a PostgreSQL URL, MongoDB URI or
//! Vault credentials the matching in-memory adapter is used instead.

use std::sync::Arc;

use mockable::Clock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use recordkeeper::domain::ports::{
    RecordRepository, RefreshTokenStore, SecretStoreProbe, UserRepository,
};
use recordkeeper::domain::{AuthService, PasswordHasher, RecordsService, TokenIssuer, TokenSecrets};
use recordkeeper::inbound::http::state::HttpState;
use recordkeeper::outbound::documents::{self, DocumentStoreError, MongoRecordRepository};
use recordkeeper::outbound::memory::{
    InMemoryRecordRepository, InMemoryRefreshTokenStore, InMemoryUserRepository,
};
use recordkeeper::outbound::persistence::{
    DbPool, DieselRefreshTokenStore, DieselUserRepository, MigrationError, PoolConfig, PoolError,
    run_migrations,
};
use recordkeeper::outbound::vault::{VaultClient, spawn_cleanup};
use recordkeeper::settings::{AppSettings, SettingsError};

/// Failures while connecting to infrastructure at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Settings failed validation.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The PostgreSQL pool could not be built.
    #[error("database pool: {0}")]
    Pool(#[from] PoolError),
    /// Migrations failed.
    #[error(transparent)]
    Migrations(#[from] MigrationError),
    /// MongoDB was unreachable or its indexes could not be prepared.
    #[error(transparent)]
    Documents(#[from] DocumentStoreError),
    /// The Vault HTTP client could not be built.
    #[error("vault client: {0}")]
    Vault(#[from] reqwest::Error),
}

/// Driven adapters chosen for this process.
pub struct Adapters {
    /// User storage.
    pub users: Arc<dyn UserRepository>,
    /// Refresh token storage.
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    /// Record version storage.
    pub records: Arc<dyn RecordRepository>,
    /// Vault health probe, when Vault holds the tokens.
    pub secret_store: Option<Arc<dyn SecretStoreProbe>>,
    /// Stale token sweep, aborted on shutdown.
    pub cleanup: Option<JoinHandle<()>>,
}

async fn postgres(settings: &AppSettings) -> Result<Option<DbPool>, StartupError> {
    let Some(url) = settings.database_url.as_deref() else {
        warn!("APP_DATABASE_URL not set; users are kept in memory");
        return Ok(None);
    };
    run_migrations(url).await?;
    let pool = DbPool::new(PoolConfig::new(url)).await?;
    info!("postgres pool ready");
    Ok(Some(pool))
}

async fn records(settings: &AppSettings) -> Result<Arc<dyn RecordRepository>, StartupError> {
    let Some(uri) = settings.mongodb_uri.as_deref() else {
        warn!("APP_MONGODB_URI not set; records are kept in memory");
        return Ok(Arc::new(InMemoryRecordRepository::new()));
    };
    let database = documents::connect(uri, settings.mongodb_database()).await?;
    let repo = MongoRecordRepository::new(&database);
    repo.ensure_indexes().await?;
    Ok(Arc::new(repo))
}

/// Connect to the configured datastores.
pub async fn build_adapters(
    settings: &AppSettings,
    clock: Arc<dyn Clock>,
) -> Result<Adapters, StartupError> {
    let pool = postgres(settings).await?;
    let records = records(settings).await?;

    let users = pool.as_ref().map_or_else(
        || -> Arc<dyn UserRepository> { Arc::new(InMemoryUserRepository::new(clock.clone())) },
        |db| -> Arc<dyn UserRepository> { Arc::new(DieselUserRepository::new(db.clone())) },
    );

    let (refresh_tokens, secret_store, cleanup): (
        Arc<dyn RefreshTokenStore>,
        Option<Arc<dyn SecretStoreProbe>>,
        Option<JoinHandle<()>>,
    ) = match (settings.vault()?, &pool) {
        (Some(config), _) => {
            info!(address = config.address(), "refresh tokens stored in vault");
            let client = VaultClient::new(config, clock.clone())?;
            let cleanup = spawn_cleanup(
                client.clone(),
                settings.cleanup_interval()?,
                settings.token_max_age_hours()?,
            );
            (
                Arc::new(client.clone()),
                Some(Arc::new(client)),
                Some(cleanup),
            )
        }
        (None, Some(db)) => {
            info!("refresh tokens stored in postgres");
            (
                Arc::new(DieselRefreshTokenStore::new(db.clone(), clock.clone())),
                None,
                None,
            )
        }
        (None, None) => (Arc::new(InMemoryRefreshTokenStore::new(clock.clone())), None, None),
    };

    Ok(Adapters {
        users,
        refresh_tokens,
        records,
        secret_store,
        cleanup,
    })
}

/// Wire the domain services over `adapters`.
#[must_use]
pub fn build_http_state(
    adapters: &Adapters,
    secrets: TokenSecrets,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
) -> HttpState {
    let auth = AuthService::new(
        adapters.users.clone(),
        adapters.refresh_tokens.clone(),
        TokenIssuer::new(secrets, clock.clone()),
        hasher,
    );
    let records = Arc::new(RecordsService::new(adapters.records.clone(), clock));
    HttpState::new(Arc::new(auth), records.clone(), records)
}

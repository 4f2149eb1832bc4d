//! Periodic removal of stale refresh tokens.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use super::client::VaultClient;

/// Run once a day unless configured otherwise.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
/// Tokens unused for a week are removed.
pub const DEFAULT_MAX_TOKEN_AGE_HOURS: i64 = 24 * 7;

/// Spawn a task that calls [`VaultClient::cleanup_expired`] every `period`.
///
/// The first sweep runs one full period after startup. Abort the returned
/// handle to stop the task. `period` must be non-zero; settings reject a
/// zero interval before it reaches here.
#[must_use]
pub fn spawn_cleanup(client: VaultClient, period: Duration, max_age_hours: i64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        info!(period_secs = period.as_secs(), max_age_hours, "refresh token cleanup scheduled");
        loop {
            ticker.tick().await;
            if let Err(err) = client.cleanup_expired(max_age_hours).await {
                error!(error = %err, "refresh token cleanup failed");
            }
        }
    })
}

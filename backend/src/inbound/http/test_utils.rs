//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use mockable::DefaultClock;

use crate::domain::{AuthService, PasswordHasher, RecordsService, TokenIssuer, TokenSecrets};
use crate::inbound::http::session_config::{SESSION_COOKIE_NAME, SessionSettings};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{
    InMemoryRecordRepository, InMemoryRefreshTokenStore, InMemoryUserRepository,
};

/// Name of the session cookie set by the middleware.
pub const SESSION_COOKIE: &str = SESSION_COOKIE_NAME;

/// Session middleware with a fresh key and the `Secure` flag off.
#[must_use]
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionSettings::ephemeral(false).middleware()
}

/// State wired to in-memory adapters and the cheapest bcrypt cost.
#[must_use]
pub fn in_memory_state() -> HttpState {
    let clock = Arc::new(DefaultClock);
    let auth = AuthService::new(
        Arc::new(InMemoryUserRepository::new(clock.clone())),
        Arc::new(InMemoryRefreshTokenStore::new(clock.clone())),
        TokenIssuer::new(
            TokenSecrets::new("test-access-secret", "test-refresh-secret"),
            clock.clone(),
        ),
        PasswordHasher::with_cost(crate::domain::password::MIN_COST),
    );
    let records = Arc::new(RecordsService::new(
        Arc::new(InMemoryRecordRepository::new()),
        clock,
    ));
    HttpState::new(Arc::new(auth), records.clone(), records)
}

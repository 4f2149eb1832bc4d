//! Shared wiring for HTTP integration suites.
//!
//! Builds the same `/api` scope the server mounts, backed by in-memory
//! adapters so suites run without Postgres, MongoDB, or Vault.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::web;
use mockable::DefaultClock;
use recordkeeper::domain::{
    AuthService, PasswordHasher, RecordsService, TokenIssuer, TokenSecrets, password,
};
use recordkeeper::inbound::http::auth::{login, logout, me, refresh, register};
use recordkeeper::inbound::http::records::{
    create_record, latest_record, list_records, record_history,
};
use recordkeeper::inbound::http::session_config::{SESSION_COOKIE_NAME, SessionSettings};
use recordkeeper::inbound::http::state::HttpState;
use recordkeeper::outbound::memory::{
    InMemoryRecordRepository, InMemoryRefreshTokenStore, InMemoryUserRepository,
};
use serde_json::Value;

/// State wired to in-memory adapters with the cheapest bcrypt cost.
pub fn memory_state() -> HttpState {
    let clock = Arc::new(DefaultClock);
    let auth = AuthService::new(
        Arc::new(InMemoryUserRepository::new(clock.clone())),
        Arc::new(InMemoryRefreshTokenStore::new(clock.clone())),
        TokenIssuer::new(
            TokenSecrets::new("integration-access", "integration-refresh"),
            clock.clone(),
        ),
        PasswordHasher::with_cost(password::MIN_COST),
    );
    let records = Arc::new(RecordsService::new(
        Arc::new(InMemoryRecordRepository::new()),
        clock,
    ));
    HttpState::new(Arc::new(auth), records.clone(), records)
}

/// Mount the `/api` scope behind a fresh ephemeral session key.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(SessionSettings::ephemeral(false).middleware())
            .service(register)
            .service(login)
            .service(refresh)
            .service(logout)
            .service(me)
            .service(list_records)
            .service(create_record)
            .service(record_history)
            .service(latest_record),
    );
}

/// The session cookie set on `res`, if any.
pub fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
}

/// The `message` field of an error envelope.
pub fn message(body: &Value) -> &str {
    body.get("message").and_then(Value::as_str).unwrap_or_default()
}

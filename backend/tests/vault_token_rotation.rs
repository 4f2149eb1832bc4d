//! Refresh token rotation and logout against a versioned in-process Vault.
//!
//! The fake keeps one KV v2 secret per username with a version counter and
//! honours `options.cas`, so late writes behave as they would on Vault.
//! Deleting the metadata entry drops the secret and its version history.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use actix_web::{App, HttpResponse, HttpServer, web};
use mockable::DefaultClock;
use recordkeeper::domain::ports::AuthSessionService;
use recordkeeper::domain::{
    AuthService, LoginContext, PasswordHasher, Registration, TokenIssuer, TokenSecrets, Username,
    password,
};
use recordkeeper::outbound::memory::InMemoryUserRepository;
use recordkeeper::outbound::vault::{VaultAuth, VaultClient, VaultConfig};
use serde_json::{Value, json};

#[derive(Default)]
struct FakeKv {
    secrets: Mutex<HashMap<String, (Value, u64)>>,
}

async fn read_secret(kv: web::Data<FakeKv>, name: web::Path<String>) -> HttpResponse {
    let secrets = kv.secrets.lock().expect("kv lock");
    match secrets.get(name.as_str()) {
        Some((data, version)) => HttpResponse::Ok().json(json!({
            "data": { "data": data, "metadata": { "version": version } }
        })),
        None => HttpResponse::NotFound().json(json!({ "errors": [] })),
    }
}

async fn write_secret(
    kv: web::Data<FakeKv>,
    name: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    let mut secrets = kv.secrets.lock().expect("kv lock");
    let current = secrets.get(name.as_str()).map_or(0, |(_, version)| *version);
    if let Some(cas) = body.pointer("/options/cas").and_then(Value::as_u64) {
        if cas != current {
            return HttpResponse::BadRequest()
                .json(json!({ "errors": ["check-and-set parameter did not match"] }));
        }
    }
    let data = body.get("data").cloned().unwrap_or(Value::Null);
    secrets.insert(name.into_inner(), (data, current + 1));
    HttpResponse::Ok().json(json!({ "data": { "version": current + 1 } }))
}

async fn delete_secret(kv: web::Data<FakeKv>, name: web::Path<String>) -> HttpResponse {
    kv.secrets.lock().expect("kv lock").remove(name.as_str());
    HttpResponse::NoContent().finish()
}

fn start_fake_vault() -> String {
    let kv = web::Data::new(FakeKv::default());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(kv.clone())
            .service(
                web::resource("/v1/secret/data/jwt-tokens/{name}")
                    .route(web::get().to(read_secret))
                    .route(web::put().to(write_secret)),
            )
            .route(
                "/v1/secret/metadata/jwt-tokens/{name}",
                web::delete().to(delete_secret),
            )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind fake vault");
    let addr = server.addrs().first().copied().expect("bound address");
    actix_web::rt::spawn(server.run());
    format!("http://{addr}")
}

fn vault_client(address: String) -> VaultClient {
    let auth = VaultAuth::from_parts(Some("root-token".into()), None, None).expect("token auth");
    let config = VaultConfig::new(Some(address), None, auth).expect("vault config");
    VaultClient::new(config, Arc::new(DefaultClock)).expect("vault client")
}

fn auth_service(vault: VaultClient) -> AuthService<InMemoryUserRepository, VaultClient> {
    let clock = Arc::new(DefaultClock);
    AuthService::new(
        Arc::new(InMemoryUserRepository::new(clock.clone())),
        Arc::new(vault),
        TokenIssuer::new(TokenSecrets::new("rotation-access", "rotation-refresh"), clock),
        PasswordHasher::with_cost(password::MIN_COST),
    )
}

async fn stored_token(vault: &VaultClient, username: &Username) -> Option<String> {
    vault
        .get_refresh_token(username, false)
        .await
        .expect("vault read")
        .map(|stored| stored.token)
}

async fn settle() {
    tokio::time::sleep(StdDuration::from_millis(150)).await;
}

#[actix_web::test]
async fn rotated_token_survives_an_earlier_touch() {
    let vault = vault_client(start_fake_vault());
    let service = auth_service(vault.clone());
    let registration =
        Registration::try_from_parts(Some("Ada"), Some("Lovelace"), "ada@example.com", "hunter2")
            .expect("registration");
    let session = service
        .register(registration, LoginContext::default())
        .await
        .expect("register");
    let username = session.user.username.clone();

    for _ in 0..5 {
        let before = stored_token(&vault, &username).await.expect("token stored");
        vault
            .get_refresh_token(&username, true)
            .await
            .expect("touching read");
        service
            .refresh(Some(username.to_string()))
            .await
            .expect("refresh");
        settle().await;
        let after = stored_token(&vault, &username).await.expect("token stored");
        assert_ne!(after, before, "refresh must leave the rotated token in place");
    }
}

#[actix_web::test]
async fn logout_stays_revoked_after_a_touch() {
    let vault = vault_client(start_fake_vault());
    let service = auth_service(vault.clone());
    let registration =
        Registration::try_from_parts(Some("Grace"), Some("Hopper"), "grace@example.com", "hunter2")
            .expect("registration");
    let session = service
        .register(registration, LoginContext::default())
        .await
        .expect("register");
    let username = session.user.username.clone();

    service
        .refresh(Some(username.to_string()))
        .await
        .expect("refresh");
    vault
        .get_refresh_token(&username, true)
        .await
        .expect("touching read");
    service.logout(&username).await.expect("logout");
    settle().await;

    assert_eq!(stored_token(&vault, &username).await, None);
    let replay = service
        .refresh(Some(username.to_string()))
        .await
        .expect_err("revoked session");
    assert_eq!(replay.message(), "Refresh token expired, please log in again");
}

#[actix_web::test]
async fn touch_updates_last_used_when_nothing_changed() {
    let vault = vault_client(start_fake_vault());
    let username = Username::new("alice").expect("username");
    vault
        .store_refresh_token(&username, "rt-1", &LoginContext::default())
        .await
        .expect("store");
    let first = vault
        .token_metadata(&username)
        .await
        .expect("metadata")
        .expect("present");

    tokio::time::sleep(StdDuration::from_millis(20)).await;
    vault
        .get_refresh_token(&username, true)
        .await
        .expect("touching read");
    settle().await;

    let touched = vault
        .token_metadata(&username)
        .await
        .expect("metadata")
        .expect("present");
    assert!(touched.last_used > first.last_used);
    assert_eq!(stored_token(&vault, &username).await.as_deref(), Some("rt-1"));
}

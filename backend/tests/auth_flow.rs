//! End-to-end authentication lifecycle through the `/api` scope.
//!
//! Covers registration, login from a second client, access token use,
//! refresh via the session cookie, and logout invalidating every refresh.

mod support;

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use recordkeeper::Trace;
use recordkeeper::domain::TRACE_ID_HEADER;
use recordkeeper::domain::auth_service::{
    ACCESS_TOKEN_REQUIRED, REFRESH_EXPIRED, REFRESH_USER_NOT_FOUND, USER_EXISTS,
};
use recordkeeper::inbound::http::validation::{json_config, query_config};
use rstest::rstest;
use serde_json::{Value, json};
use support::{api_routes, memory_state, message, session_cookie};

async fn app() -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(web::Data::new(memory_state()))
            .app_data(json_config())
            .app_data(query_config())
            .wrap(Trace)
            .configure(api_routes),
    )
    .await
}

async fn post(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    uri: &str,
    body: Value,
) -> ServiceResponse {
    test::call_service(app, test::TestRequest::post().uri(uri).set_json(body).to_request()).await
}

async fn refresh_with(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    cookie: Cookie<'static>,
) -> ServiceResponse {
    test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/auth/refresh")
            .cookie(cookie)
            .to_request(),
    )
    .await
}

fn grace() -> Value {
    json!({
        "firstName": "Grace",
        "lastName": "Hopper",
        "email": "grace@example.com",
        "password": "cobol-forever"
    })
}

#[actix_web::test]
async fn full_session_lifecycle() {
    let app = app().await;

    let res = post(&app, "/api/auth/register", grace()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let register_cookie = session_cookie(&res).expect("register sets the session cookie");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["user"]["username"], "hopperg");
    assert!(body["accessToken"].as_str().is_some_and(|t| !t.is_empty()));

    let res = post(
        &app,
        "/api/auth/login",
        json!({ "email": "GRACE@example.com", "password": "cobol-forever" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let login_cookie = session_cookie(&res).expect("login sets the session cookie");
    let body: Value = test::read_body_json(res).await;
    let access = body["accessToken"].as_str().expect("access token").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {access}")))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["user"]["email"], "grace@example.com");

    let res = refresh_with(&app, login_cookie.clone()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let refreshed = body["accessToken"].as_str().expect("access token").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/logout")
            .insert_header(("Authorization", format!("Bearer {refreshed}")))
            .cookie(login_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Both clients shared one stored refresh token, so both are logged out.
    for cookie in [register_cookie, login_cookie] {
        let res = refresh_with(&app, cookie).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(message(&body), REFRESH_EXPIRED);
    }
}

#[actix_web::test]
async fn colliding_usernames_get_numeric_suffixes() {
    let app = app().await;
    let mut usernames = Vec::new();
    for email in ["g1@example.com", "g2@example.com", "g3@example.com"] {
        let mut body = grace();
        body["email"] = json!(email);
        let res = post(&app, "/api/auth/register", body).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        usernames.push(body["user"]["username"].as_str().unwrap_or_default().to_owned());
    }
    assert_eq!(usernames, ["hopperg", "hopperg1", "hopperg2"]);
}

#[actix_web::test]
async fn duplicate_registration_is_case_insensitive() {
    let app = app().await;
    post(&app, "/api/auth/register", grace()).await;
    let mut again = grace();
    again["email"] = json!("Grace@Example.COM");
    let res = post(&app, "/api/auth/register", again).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(message(&body), USER_EXISTS);
}

#[rstest]
#[case("/api/auth/me")]
#[case("/api/auth/logout")]
#[actix_web::test]
async fn protected_endpoints_echo_trace_id(#[case] uri: &str) {
    let app = app().await;
    let trace_id = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
    let method = if uri.ends_with("logout") {
        test::TestRequest::post()
    } else {
        test::TestRequest::get()
    };
    let res = test::call_service(
        &app,
        method
            .uri(uri)
            .insert_header((TRACE_ID_HEADER, trace_id))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    assert_eq!(header.as_deref(), Some(trace_id));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(message(&body), ACCESS_TOKEN_REQUIRED);
    assert_eq!(body["traceId"], trace_id);
}

#[actix_web::test]
async fn refresh_with_foreign_cookie_is_forbidden() {
    let app = app().await;
    let res = refresh_with(&app, Cookie::new("session", "not-a-valid-private-cookie")).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(message(&body), REFRESH_USER_NOT_FOUND);
}

#[actix_web::test]
async fn malformed_json_uses_error_envelope() {
    let app = app().await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(message(&body), "Malformed request body");
}

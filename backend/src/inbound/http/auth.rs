//! Authentication API handlers.
//!
//! ```text
//! POST /api/auth/register {"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com","password":"pw"}
//! POST /api/auth/login    {"email":"ada@example.com","password":"pw"}
//! POST /api/auth/refresh  (session cookie)
//! POST /api/auth/logout   (Authorization header)
//! GET  /api/auth/me       (Authorization header)
//! ```

use actix_web::http::header::USER_AGENT;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::auth_service::INVALID_CREDENTIALS;
use crate::domain::ports::IssuedSession;
use crate::domain::{
    CREDENTIALS_REQUIRED, Error, ErrorCode, LoginContext, LoginCredentials, LoginValidationError,
    Registration, UserProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access_token::Authenticated;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Message returned by a successful registration.
pub const REGISTERED_MESSAGE: &str = "User registered successfully";
/// Message returned by a successful login.
pub const LOGGED_IN_MESSAGE: &str = "Login successful";
/// Message returned by a successful logout.
pub const LOGGED_OUT_MESSAGE: &str = "Logout successful";

/// Registration body. Names are optional; email and password are required.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Account email.
    pub email: Option<String>,
    /// Plain-text password.
    pub password: Option<String>,
}

/// Login body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    /// Account email.
    pub email: Option<String>,
    /// Plain-text password.
    pub password: Option<String>,
}

/// Body returned when a session is opened or refreshed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Present on register and login, absent on refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Bearer token for API calls.
    pub access_token: String,
    /// The signed-in user.
    pub user: UserProfile,
}

impl SessionResponse {
    fn new(message: Option<&str>, issued: &IssuedSession) -> Self {
        Self {
            message: message.map(str::to_owned),
            access_token: issued.access_token.clone(),
            user: issued.user.profile(),
        }
    }
}

/// Body carrying only a status message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

/// Body for `GET /api/auth/me`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CurrentUserResponse {
    /// The authenticated user.
    pub user: UserProfile,
}

fn required<'a>(value: Option<&'a String>) -> Result<&'a str, Error> {
    value
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::invalid_request(CREDENTIALS_REQUIRED))
}

fn map_registration_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail | LoginValidationError::EmptyPassword => {
            Error::invalid_request(CREDENTIALS_REQUIRED)
        }
        LoginValidationError::InvalidEmail(inner) => Error::invalid_request("Invalid email address")
            .with_details(json!({ "field": "email", "reason": inner.to_string() })),
    }
}

fn map_login_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail | LoginValidationError::EmptyPassword => {
            Error::invalid_request(CREDENTIALS_REQUIRED)
        }
        // A malformed email cannot belong to an account.
        LoginValidationError::InvalidEmail(_) => Error::unauthorized(INVALID_CREDENTIALS),
    }
}

/// Client address and user agent recorded with the refresh token.
#[must_use]
pub fn login_context(req: &HttpRequest) -> LoginContext {
    let ip_address = req
        .connection_info()
        .realip_remote_addr()
        .map(str::to_owned);
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    LoginContext {
        ip_address,
        user_agent,
    }
}

/// Create an account and open a session.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = SessionResponse,
            headers(("Set-Cookie" = String, description = "Refresh session cookie"))),
        (status = 400, description = "Email and password are required", body = Error),
        (status = 409, description = "User already exists", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let registration = Registration::try_from_parts(
        body.first_name.as_deref(),
        body.last_name.as_deref(),
        required(body.email.as_ref())?,
        required(body.password.as_ref())?,
    )
    .map_err(map_registration_error)?;
    let issued = state.auth.register(registration, login_context(&req)).await?;
    session.persist_username(&issued.user.username)?;
    Ok(HttpResponse::Ok().json(SessionResponse::new(Some(REGISTERED_MESSAGE), &issued)))
}

/// Verify credentials and open a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse,
            headers(("Set-Cookie" = String, description = "Refresh session cookie"))),
        (status = 400, description = "Email and password are required", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        required(body.email.as_ref())?,
        required(body.password.as_ref())?,
    )
    .map_err(map_login_error)?;
    let issued = state.auth.login(credentials, login_context(&req)).await?;
    session.persist_username(&issued.user.username)?;
    Ok(HttpResponse::Ok().json(SessionResponse::new(Some(LOGGED_IN_MESSAGE), &issued)))
}

/// Issue a new access token for the session cookie's user.
///
/// An expired or revoked refresh token also clears the session cookie so the
/// client falls back to the login page.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "New access token", body = SessionResponse),
        (status = 401, description = "Refresh token expired, please log in again", body = Error),
        (status = 403, description = "Username not found for refresh token", body = Error),
        (status = 503, description = "Token store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "refresh",
    security([])
)]
#[post("/auth/refresh")]
pub async fn refresh(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let username = session.username()?;
    match state.auth.refresh(username).await {
        Ok(issued) => Ok(HttpResponse::Ok().json(SessionResponse::new(None, &issued))),
        Err(err) => {
            if matches!(err.code(), ErrorCode::Unauthorized | ErrorCode::Forbidden) {
                session.purge();
            }
            Err(err)
        }
    }
}

/// Revoke the refresh token and clear the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Access token required", body = Error),
        (status = 403, description = "Invalid or expired token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
    user: Authenticated,
) -> ApiResult<HttpResponse> {
    state.auth.logout(&user.username).await?;
    session.purge();
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: LOGGED_OUT_MESSAGE.to_owned(),
    }))
}

/// The user behind the access token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Access token required", body = Error),
        (status = 403, description = "Invalid or expired token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn me(user: Authenticated) -> web::Json<CurrentUserResponse> {
    web::Json(CurrentUserResponse {
        user: user.profile(),
    })
}

//! Access token extraction and authentication.
//!
//! The token is read from the `Authorization` header, either raw or as
//! `Bearer <token>`, and resolved to a user through [`AuthSessionService`].
//!
//! [`AuthSessionService`]: crate::domain::ports::AuthSessionService

use std::ops::Deref;

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::auth_service::ACCESS_TOKEN_REQUIRED;
use crate::domain::{Error, User};
use crate::inbound::http::state::HttpState;

/// Read the access token from request headers.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match raw.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if raw.eq_ignore_ascii_case("bearer") => "",
        _ => raw,
    };
    (!token.is_empty()).then(|| token.to_owned())
}

/// The user resolved from a valid access token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub User);

impl Deref for Authenticated {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let presented = bearer_token(req.headers());
        let configured = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let state = configured.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let token = presented.ok_or_else(|| Error::unauthorized(ACCESS_TOKEN_REQUIRED))?;
            state.auth.authenticate(&token).await.map(Self)
        })
    }
}

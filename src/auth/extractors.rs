use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::services::{JwtKeys, TokenError};
use crate::{config::TOKEN_COOKIE, error::AppError};

/// Identity taken from a valid `token_form` cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// Same check as [`AuthUser`] for HTML routes: a rejected request is sent
/// to the registration page instead of getting a 401.
#[derive(Debug, Clone)]
pub struct PageUser(pub AuthUser);

enum GateFailure {
    Missing,
    Rejected(TokenError),
}

fn authenticate(parts: &Parts, keys: &JwtKeys) -> Result<AuthUser, GateFailure> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|c| c.value())
        .filter(|v| !v.is_empty())
        .ok_or(GateFailure::Missing)?;
    let claims = keys.verify(token).map_err(GateFailure::Rejected)?;
    Ok(AuthUser {
        id: claims.user_id,
        username: claims.username,
    })
}

fn log_failure(parts: &Parts, failure: &GateFailure) {
    match failure {
        GateFailure::Missing => warn!(uri = %parts.uri, "missing token cookie"),
        GateFailure::Rejected(e) => warn!(uri = %parts.uri, error = %e, "token rejected"),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        authenticate(parts, &keys).map_err(|failure| {
            log_failure(parts, &failure);
            match failure {
                GateFailure::Missing => AppError::Unauthorized("Not authenticated".into()),
                GateFailure::Rejected(_) => AppError::Unauthorized("Invalid token".into()),
            }
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PageUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        authenticate(parts, &keys).map(PageUser).map_err(|failure| {
            log_failure(parts, &failure);
            Redirect::to("/register")
        })
    }
}

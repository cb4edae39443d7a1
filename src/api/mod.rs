//! HTTP handlers for the catalog site

pub mod accounts;
pub mod authors;
pub mod books;
pub mod catalog;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod records;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::Html,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{user::authorize, user::Access, UserClaims},
    templates::Layout,
    AppState,
};

/// Cookie carrying the caller's JWT
pub const AUTH_COOKIE: &str = "auth_token";

/// Cookie naming the caller's visitor session
pub const SESSION_COOKIE: &str = "sessionid";

/// The caller of a request, signed in or not
///
/// A missing, expired or forged token, or one naming an account that is no
/// longer active, yields an anonymous caller rather than a rejection; each
/// handler decides what access it needs. Grants are read from the user store
/// on every request, not from the token.
pub struct Caller {
    pub claims: Option<UserClaims>,
    /// Path and query of the request, for redirects back after login
    pub path: String,
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        let token = bearer.or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get(AUTH_COOKIE)
                .map(|cookie| cookie.value().to_string())
        });

        let claims = match token {
            Some(token) => state.services.auth.resolve_token(&token).await?,
            None => None,
        };

        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        Ok(Caller { claims, path })
    }
}

impl Caller {
    /// Gate a handler; see [`authorize`]
    pub fn authorize(&self, access: Access) -> AppResult<&UserClaims> {
        authorize(self.claims.as_ref(), access, &self.path)
    }

    /// Render `template` with the navigation for this caller
    pub fn render<T: Serialize>(&self, state: &AppState, template: &str, body: T) -> AppResult<Html<String>> {
        state
            .templates
            .render(template, &Layout::new(self.claims.as_ref(), &self.path, body))
    }
}

/// Session id from the cookie jar, minting a new session when the cookie is
/// missing or malformed
pub fn visitor_session(jar: CookieJar, ttl_seconds: u64, secure: bool) -> (CookieJar, String) {
    if let Some(id) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    {
        return (jar, id.to_string());
    }

    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl_seconds as i64));

    tracing::debug!("Started visitor session {}", id);
    (jar.add(cookie), id)
}

/// Record identifier taken from the URL; one that does not parse names no
/// record
pub fn parse_id<T: FromStr>(raw: &str, kind: &str) -> AppResult<T> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("{} {} not found", kind, raw)))
}

/// Current local date, against which due dates are judged
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

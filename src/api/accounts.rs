//! Sign-in and sign-out pages

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    templates, AppState,
};

use super::{Caller, AUTH_COOKIE};

/// Page shown after signing in when no `next` was given
const DEFAULT_REDIRECT: &str = "/catalog";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    /// Page to return to once signed in
    pub next: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Serialize)]
struct LoginView<'a> {
    username: &'a str,
    next: &'a str,
    error: Option<String>,
}

/// Only same-site absolute paths are followed after login.
///
/// Control characters and whitespace are refused outright: browsers strip
/// some of them, which would turn `/\t/host` into `//host`.
fn safe_next(next: &str) -> &str {
    let followable = next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(|c| c.is_ascii_control() || c.is_whitespace());

    if followable {
        next
    } else {
        DEFAULT_REDIRECT
    }
}

#[utoipa::path(
    get,
    path = "/accounts/login",
    tag = "accounts",
    params(LoginQuery),
    responses(
        (status = 200, description = "Login form", body = String, content_type = "text/html")
    )
)]
pub async fn login_form(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<LoginQuery>,
) -> AppResult<Html<String>> {
    caller.render(
        &state,
        templates::LOGIN,
        LoginView {
            username: "",
            next: query.next.as_deref().unwrap_or_default(),
            error: None,
        },
    )
}

#[utoipa::path(
    post,
    path = "/accounts/login",
    tag = "accounts",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in; token cookie set and redirect to next"),
        (status = 200, description = "Form shown again with an error", body = String, content_type = "text/html")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    caller: Caller,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match state.services.auth.login(&form.username, &form.password).await {
        Ok((token, _claims)) => {
            let cookie = Cookie::build((AUTH_COOKIE, token))
                .path("/")
                .http_only(true)
                .secure(state.config.auth.cookie_secure)
                .same_site(SameSite::Lax)
                .max_age(time::Duration::hours(state.config.auth.jwt_expiration_hours as i64));

            let target = safe_next(&form.next).to_string();
            Ok((jar.add(cookie), Redirect::to(&target)).into_response())
        }
        Err(AppError::Authentication(message)) => {
            let page = caller.render(
                &state,
                templates::LOGIN,
                LoginView {
                    username: &form.username,
                    next: &form.next,
                    error: Some(message),
                },
            )?;
            Ok(page.into_response())
        }
        Err(e) => Err(e),
    }
}

#[utoipa::path(
    post,
    path = "/accounts/logout",
    tag = "accounts",
    responses(
        (status = 200, description = "Token cookie removed", body = String, content_type = "text/html")
    )
)]
pub async fn logout(State(state): State<AppState>, caller: Caller, jar: CookieJar) -> AppResult<Response> {
    if let Some(claims) = &caller.claims {
        tracing::info!("User {} logged out", claims.sub);
    }

    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    let signed_out = Caller {
        claims: None,
        path: caller.path,
    };
    let page = signed_out.render(&state, templates::LOGGED_OUT, serde_json::json!({}))?;
    Ok((jar, page).into_response())
}

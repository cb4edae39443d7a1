//! Landing page

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{error::AppResult, templates, AppState};

use super::{visitor_session, Caller};

/// Catalog home with record counts and the visitor's visit count
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Landing page", body = String, content_type = "text/html")
    )
)]
pub async fn index(
    State(state): State<AppState>,
    caller: Caller,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let (jar, session_id) = visitor_session(
        jar,
        state.config.session.ttl_seconds,
        state.config.auth.cookie_secure,
    );
    let metrics = state.services.catalog.landing_metrics(&session_id).await?;
    let page = caller.render(&state, templates::INDEX, metrics)?;
    Ok((jar, page))
}

pub async fn root() -> Redirect {
    Redirect::to("/catalog")
}

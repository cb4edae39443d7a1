//! Author list and detail pages

use axum::{
    extract::{Path, Query, State},
    response::Html,
};

use crate::{
    error::AppResult,
    models::{user::Access, PageQuery},
    templates, AppState,
};

use super::{parse_id, Caller};

/// Paginated list of authors, ten per page
#[utoipa::path(
    get,
    path = "/catalog/authors",
    tag = "authors",
    params(PageQuery),
    responses(
        (status = 200, description = "Author list page", body = String, content_type = "text/html"),
        (status = 303, description = "Login required"),
        (status = 404, description = "No such page")
    )
)]
pub async fn author_list(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    caller.authorize(Access::Login)?;

    let page = state.services.catalog.list_authors(query.page.as_deref()).await?;
    caller.render(&state, templates::AUTHOR_LIST, page)
}

/// An author with their books
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author detail page", body = String, content_type = "text/html"),
        (status = 303, description = "Login required"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_detail(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    caller.authorize(Access::Login)?;
    let id = parse_id(&id, "Author")?;

    let details = state.services.catalog.author_details(id).await?;
    caller.render(&state, templates::AUTHOR_DETAIL, details)
}

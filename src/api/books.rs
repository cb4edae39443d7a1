//! Book list and detail pages

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{user::Access, Author, Book, Genre, PageQuery},
    templates, AppState,
};

use super::{loans::CopyView, parse_id, today, Caller};

#[derive(Serialize)]
struct BookDetailView {
    #[serde(flatten)]
    book: Book,
    author: Author,
    genres: Vec<Genre>,
    copies: Vec<CopyView>,
}

/// Paginated list of books, four per page
#[utoipa::path(
    get,
    path = "/catalog/books",
    tag = "books",
    params(PageQuery),
    responses(
        (status = 200, description = "Book list page", body = String, content_type = "text/html"),
        (status = 303, description = "Login required"),
        (status = 404, description = "No such page")
    )
)]
pub async fn book_list(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    caller.authorize(Access::Login)?;

    let page = state.services.catalog.list_books(query.page.as_deref()).await?;
    caller.render(&state, templates::BOOK_LIST, page)
}

/// A book with its author, genres and copies
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book detail page", body = String, content_type = "text/html"),
        (status = 303, description = "Login required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_detail(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    caller.authorize(Access::Login)?;
    let id = parse_id(&id, "Book")?;

    let details = state.services.catalog.book_details(id).await?;
    let today = today();
    let view = BookDetailView {
        book: details.book,
        author: details.author,
        genres: details.genres,
        copies: details
            .copies
            .into_iter()
            .map(|copy| CopyView::new(copy, today))
            .collect(),
    };
    caller.render(&state, templates::BOOK_DETAIL, view)
}

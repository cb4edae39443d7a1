//! Create, update and delete pages for authors and books
//!
//! Each POST binds only the fields of its [`FieldSet`](crate::forms::FieldSet);
//! invalid submissions are shown again with their errors and nothing is saved.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Serialize;

use crate::{
    error::AppResult,
    forms::{
        author::{AUTHOR_CREATE_FIELDS, AUTHOR_UPDATE_FIELDS},
        book::BOOK_FIELDS,
        AuthorForm, BookForm, FormErrors,
    },
    models::{Author, Book},
    services::records::{BookChoices, FormOutcome},
    templates, AppState,
};

use super::{parse_id, Caller};

type Submission = Vec<(String, String)>;

#[derive(Serialize)]
struct AuthorFormView<'a> {
    heading: &'static str,
    form: &'a AuthorForm,
    errors: FormErrors,
}

#[derive(Serialize)]
struct ChoiceView {
    id: i32,
    name: String,
    selected: bool,
}

#[derive(Serialize)]
struct BookFormView<'a> {
    heading: &'static str,
    form: &'a BookForm,
    errors: FormErrors,
    authors: Vec<ChoiceView>,
    genres: Vec<ChoiceView>,
}

impl<'a> BookFormView<'a> {
    fn new(heading: &'static str, form: &'a BookForm, errors: FormErrors, choices: BookChoices) -> Self {
        let author_id = form.author_id();
        Self {
            heading,
            form,
            errors,
            authors: choices
                .authors
                .into_iter()
                .map(|author| ChoiceView {
                    selected: Some(author.id) == author_id,
                    name: author.display_name(),
                    id: author.id,
                })
                .collect(),
            genres: choices
                .genres
                .into_iter()
                .map(|genre| ChoiceView {
                    selected: form.has_genre(genre.id),
                    id: genre.id,
                    name: genre.name,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct AuthorDeleteView {
    author: Author,
    books: Vec<Book>,
}

#[derive(Serialize)]
struct BookDeleteView {
    book: Book,
    copies: usize,
}

fn author_url(id: i32) -> String {
    format!("/catalog/author/{}", id)
}

fn book_url(id: i32) -> String {
    format!("/catalog/book/{}", id)
}

// Authors

#[utoipa::path(
    get,
    path = "/catalog/author/create",
    tag = "records",
    responses(
        (status = 200, description = "Blank author form", body = String, content_type = "text/html")
    )
)]
pub async fn author_create_form(State(state): State<AppState>, caller: Caller) -> AppResult<Html<String>> {
    let form = AuthorForm::initial();
    caller.render(
        &state,
        templates::AUTHOR_FORM,
        AuthorFormView {
            heading: "Create Author",
            form: &form,
            errors: FormErrors::new(),
        },
    )
}

#[utoipa::path(
    post,
    path = "/catalog/author/create",
    tag = "records",
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created; redirect to the author"),
        (status = 200, description = "Form shown again with errors", body = String, content_type = "text/html")
    )
)]
pub async fn author_create(
    State(state): State<AppState>,
    caller: Caller,
    Form(submission): Form<Submission>,
) -> AppResult<Response> {
    let form = AuthorForm::from_data(&AUTHOR_CREATE_FIELDS.bind(submission));

    match state.services.records.create_author(&form).await? {
        FormOutcome::Saved(author) => Ok(Redirect::to(&author_url(author.id)).into_response()),
        FormOutcome::Invalid(errors) => Ok(caller
            .render(
                &state,
                templates::AUTHOR_FORM,
                AuthorFormView {
                    heading: "Create Author",
                    form: &form,
                    errors,
                },
            )?
            .into_response()),
    }
}

#[utoipa::path(
    get,
    path = "/catalog/author/{id}/update",
    tag = "records",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author form filled from the record", body = String, content_type = "text/html"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_update_form(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_id(&id, "Author")?;
    let author = state.services.records.get_author(id).await?;
    let form = AuthorForm::from_author(&author);
    caller.render(
        &state,
        templates::AUTHOR_FORM,
        AuthorFormView {
            heading: "Update Author",
            form: &form,
            errors: FormErrors::new(),
        },
    )
}

#[utoipa::path(
    post,
    path = "/catalog/author/{id}/update",
    tag = "records",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated; redirect to the author"),
        (status = 200, description = "Form shown again with errors", body = String, content_type = "text/html"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Form(submission): Form<Submission>,
) -> AppResult<Response> {
    let id = parse_id(&id, "Author")?;
    let form = AuthorForm::from_data(&AUTHOR_UPDATE_FIELDS.bind(submission));

    match state.services.records.update_author(id, &form).await? {
        FormOutcome::Saved(author) => Ok(Redirect::to(&author_url(author.id)).into_response()),
        FormOutcome::Invalid(errors) => Ok(caller
            .render(
                &state,
                templates::AUTHOR_FORM,
                AuthorFormView {
                    heading: "Update Author",
                    form: &form,
                    errors,
                },
            )?
            .into_response()),
    }
}

#[utoipa::path(
    get,
    path = "/catalog/author/{id}/delete",
    tag = "records",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Delete confirmation", body = String, content_type = "text/html"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_delete_form(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_id(&id, "Author")?;
    let details = state.services.catalog.author_details(id).await?;
    caller.render(
        &state,
        templates::AUTHOR_CONFIRM_DELETE,
        AuthorDeleteView {
            author: details.author,
            books: details.books,
        },
    )
}

#[utoipa::path(
    post,
    path = "/catalog/author/{id}/delete",
    tag = "records",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 303, description = "Deleted; redirect to the author list"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still has books")
    )
)]
pub async fn author_delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Redirect> {
    let id = parse_id(&id, "Author")?;
    state.services.records.delete_author(id).await?;
    Ok(Redirect::to("/catalog/authors"))
}

// Books

#[utoipa::path(
    get,
    path = "/catalog/book/create",
    tag = "records",
    responses(
        (status = 200, description = "Blank book form", body = String, content_type = "text/html")
    )
)]
pub async fn book_create_form(State(state): State<AppState>, caller: Caller) -> AppResult<Html<String>> {
    let choices = state.services.records.book_choices().await?;
    let form = BookForm::default();
    caller.render(
        &state,
        templates::BOOK_FORM,
        BookFormView::new("Create Book", &form, FormErrors::new(), choices),
    )
}

#[utoipa::path(
    post,
    path = "/catalog/book/create",
    tag = "records",
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created; redirect to the book"),
        (status = 200, description = "Form shown again with errors", body = String, content_type = "text/html")
    )
)]
pub async fn book_create(
    State(state): State<AppState>,
    caller: Caller,
    Form(submission): Form<Submission>,
) -> AppResult<Response> {
    let form = BookForm::from_data(&BOOK_FIELDS.bind(submission));

    match state.services.records.create_book(&form).await? {
        FormOutcome::Saved(book) => Ok(Redirect::to(&book_url(book.id)).into_response()),
        FormOutcome::Invalid(errors) => {
            let choices = state.services.records.book_choices().await?;
            Ok(caller
                .render(
                    &state,
                    templates::BOOK_FORM,
                    BookFormView::new("Create Book", &form, errors, choices),
                )?
                .into_response())
        }
    }
}

#[utoipa::path(
    get,
    path = "/catalog/book/{id}/update",
    tag = "records",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book form filled from the record", body = String, content_type = "text/html"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_update_form(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_id(&id, "Book")?;
    let (book, genre_ids) = state.services.records.get_book(id).await?;
    let choices = state.services.records.book_choices().await?;
    let form = BookForm::from_book(&book, &genre_ids);
    caller.render(
        &state,
        templates::BOOK_FORM,
        BookFormView::new("Update Book", &form, FormErrors::new(), choices),
    )
}

#[utoipa::path(
    post,
    path = "/catalog/book/{id}/update",
    tag = "records",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated; redirect to the book"),
        (status = 200, description = "Form shown again with errors", body = String, content_type = "text/html"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Form(submission): Form<Submission>,
) -> AppResult<Response> {
    let id = parse_id(&id, "Book")?;
    let form = BookForm::from_data(&BOOK_FIELDS.bind(submission));

    match state.services.records.update_book(id, &form).await? {
        FormOutcome::Saved(book) => Ok(Redirect::to(&book_url(book.id)).into_response()),
        FormOutcome::Invalid(errors) => {
            let choices = state.services.records.book_choices().await?;
            Ok(caller
                .render(
                    &state,
                    templates::BOOK_FORM,
                    BookFormView::new("Update Book", &form, errors, choices),
                )?
                .into_response())
        }
    }
}

#[utoipa::path(
    get,
    path = "/catalog/book/{id}/delete",
    tag = "records",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Delete confirmation", body = String, content_type = "text/html"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_delete_form(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_id(&id, "Book")?;
    let details = state.services.catalog.book_details(id).await?;
    caller.render(
        &state,
        templates::BOOK_CONFIRM_DELETE,
        BookDeleteView {
            copies: details.copies.len(),
            book: details.book,
        },
    )
}

#[utoipa::path(
    post,
    path = "/catalog/book/{id}/delete",
    tag = "records",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Deleted along with its copies; redirect to the book list"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Redirect> {
    let id = parse_id(&id, "Book")?;
    state.services.records.delete_book(id).await?;
    Ok(Redirect::to("/catalog/books"))
}

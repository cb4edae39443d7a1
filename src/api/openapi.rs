//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{accounts, authors, books, catalog, health, loans, records};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library Catalog",
        version = "1.0.0",
        description = "Server-rendered library catalog: books, authors, copies and loans"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::index,
        books::book_list,
        books::book_detail,
        authors::author_list,
        authors::author_detail,
        // Loans
        loans::my_books,
        loans::all_borrowed,
        loans::renew_form,
        loans::renew_submit,
        // Records
        records::author_create_form,
        records::author_create,
        records::author_update_form,
        records::author_update,
        records::author_delete_form,
        records::author_delete,
        records::book_create_form,
        records::book_create,
        records::book_update_form,
        records::book_update,
        records::book_delete_form,
        records::book_delete,
        // Accounts
        accounts::login_form,
        accounts::login,
        accounts::logout,
    ),
    components(
        schemas(
            crate::models::Author,
            crate::models::Book,
            crate::models::BookShort,
            crate::models::Genre,
            crate::models::BookInstance,
            crate::models::LoanStatus,
            crate::forms::RenewBookForm,
            crate::forms::AuthorForm,
            crate::forms::BookForm,
            accounts::LoginForm,
            health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Landing page"),
        (name = "books", description = "Book pages"),
        (name = "authors", description = "Author pages"),
        (name = "loans", description = "Loans and renewals"),
        (name = "records", description = "Author and book maintenance"),
        (name = "accounts", description = "Sign in and out")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

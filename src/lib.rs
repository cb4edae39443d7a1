//! Local Library catalog server
//!
//! Server-rendered catalog of books, authors and their copies, with loan
//! listings, librarian renewals and record maintenance pages.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod repository;
pub mod services;
pub mod templates;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub templates: Arc<templates::Templates>,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let site = Router::new()
        .route("/", get(api::catalog::root))
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Accounts
        .route("/accounts/login", get(api::accounts::login_form).post(api::accounts::login))
        .route("/accounts/logout", get(api::accounts::logout).post(api::accounts::logout))
        // Catalog
        .route("/catalog", get(api::catalog::index))
        .route("/catalog/books", get(api::books::book_list))
        .route("/catalog/book/:id", get(api::books::book_detail))
        .route("/catalog/authors", get(api::authors::author_list))
        .route("/catalog/author/:id", get(api::authors::author_detail))
        // Loans
        .route("/catalog/mybooks", get(api::loans::my_books))
        .route("/catalog/borrowed", get(api::loans::all_borrowed))
        .route(
            "/catalog/book/:id/renew",
            get(api::loans::renew_form).post(api::loans::renew_submit),
        )
        // Authors
        .route(
            "/catalog/author/create",
            get(api::records::author_create_form).post(api::records::author_create),
        )
        .route(
            "/catalog/author/:id/update",
            get(api::records::author_update_form).post(api::records::author_update),
        )
        .route(
            "/catalog/author/:id/delete",
            get(api::records::author_delete_form).post(api::records::author_delete),
        )
        // Books
        .route(
            "/catalog/book/create",
            get(api::records::book_create_form).post(api::records::book_create),
        )
        .route(
            "/catalog/book/:id/update",
            get(api::records::book_update_form).post(api::records::book_update),
        )
        .route(
            "/catalog/book/:id/delete",
            get(api::records::book_delete_form).post(api::records::book_delete),
        )
        .with_state(state);

    Router::new()
        .merge(site)
        .merge(api::openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
}

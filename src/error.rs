//! Error types for the catalog server

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

/// Path of the login page unauthenticated callers are sent to
pub const LOGIN_PATH: &str = "/accounts/login";

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The caller is anonymous; answered with a redirect to the login page
    #[error("Login required to access {next}")]
    LoginRequired { next: String },

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::LoginRequired { .. } => StatusCode::SEE_OTHER,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<handlebars::RenderError> for AppError {
    fn from(e: handlebars::RenderError) -> Self {
        AppError::Internal(format!("Template rendering failed: {}", e))
    }
}

/// Login URL carrying the page to come back to once signed in
pub fn login_redirect_url(next: &str) -> String {
    format!("{}?next={}", LOGIN_PATH, urlencoding::encode(next))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (title, message) = match &self {
            AppError::LoginRequired { next } => {
                return Redirect::to(&login_redirect_url(next)).into_response();
            }
            AppError::Authentication(msg) => ("Not authenticated", msg.clone()),
            AppError::Authorization(msg) => {
                tracing::debug!("Access denied: {}", msg);
                ("Forbidden", msg.clone())
            }
            AppError::NotFound(msg) => ("Not found", msg.clone()),
            AppError::Validation(msg) | AppError::BadRequest(msg) => ("Bad request", msg.clone()),
            AppError::Conflict(msg) => ("Conflict", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("Server error", "Database error".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Server error", "Internal server error".to_string())
            }
        };

        let body = Html(format!(
            "<!DOCTYPE html>\n<html><head><title>{title}</title></head>\
             <body><h1>{code} {title}</h1><p>{message}</p><p><a href=\"/catalog\">Home</a></p></body></html>",
            code = status.as_u16(),
            title = title,
            message = handlebars::html_escape(&message),
        ));

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

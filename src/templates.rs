//! Server-side HTML rendering
//!
//! Every page template is compiled into the binary and registered once at
//! startup. Pages wrap their content in the `base` partial, which draws the
//! navigation from the [`Layout`] fields.

use axum::response::Html;
use handlebars::Handlebars;
use serde::Serialize;

use crate::{
    error::{login_redirect_url, AppError, AppResult},
    models::{user::CAN_MARK_RETURNED, UserClaims},
};

pub const INDEX: &str = "index";
pub const BOOK_LIST: &str = "book_list";
pub const BOOK_DETAIL: &str = "book_detail";
pub const AUTHOR_LIST: &str = "author_list";
pub const AUTHOR_DETAIL: &str = "author_detail";
pub const BORROWED_BY_USER: &str = "bookinstance_list_borrowed_user";
pub const ALL_BORROWED: &str = "bookinstance_list_all_borrowed";
pub const RENEW: &str = "book_renew_librarian";
pub const AUTHOR_FORM: &str = "author_form";
pub const AUTHOR_CONFIRM_DELETE: &str = "author_confirm_delete";
pub const BOOK_FORM: &str = "book_form";
pub const BOOK_CONFIRM_DELETE: &str = "book_confirm_delete";
pub const LOGIN: &str = "login";
pub const LOGGED_OUT: &str = "logged_out";

const PARTIALS: &[(&str, &str)] = &[
    ("base", include_str!("../templates/base.hbs")),
    ("pagination", include_str!("../templates/pagination.hbs")),
];

const PAGES: &[(&str, &str)] = &[
    (INDEX, include_str!("../templates/index.hbs")),
    (BOOK_LIST, include_str!("../templates/book_list.hbs")),
    (BOOK_DETAIL, include_str!("../templates/book_detail.hbs")),
    (AUTHOR_LIST, include_str!("../templates/author_list.hbs")),
    (AUTHOR_DETAIL, include_str!("../templates/author_detail.hbs")),
    (BORROWED_BY_USER, include_str!("../templates/bookinstance_list_borrowed_user.hbs")),
    (ALL_BORROWED, include_str!("../templates/bookinstance_list_all_borrowed.hbs")),
    (RENEW, include_str!("../templates/book_renew_librarian.hbs")),
    (AUTHOR_FORM, include_str!("../templates/author_form.hbs")),
    (AUTHOR_CONFIRM_DELETE, include_str!("../templates/author_confirm_delete.hbs")),
    (BOOK_FORM, include_str!("../templates/book_form.hbs")),
    (BOOK_CONFIRM_DELETE, include_str!("../templates/book_confirm_delete.hbs")),
    (LOGIN, include_str!("../templates/login.hbs")),
    (LOGGED_OUT, include_str!("../templates/logged_out.hbs")),
];

/// Page context shared by every template
#[derive(Debug, Serialize)]
pub struct Layout<'a, T> {
    /// Username of the signed-in caller
    pub user: Option<&'a str>,
    pub can_mark_returned: bool,
    /// Request path without the query string, used by pagination links
    pub request_path: &'a str,
    pub login_url: String,
    #[serde(flatten)]
    pub body: T,
}

impl<'a, T> Layout<'a, T> {
    pub fn new(claims: Option<&'a UserClaims>, path: &'a str, body: T) -> Self {
        let request_path = path.split('?').next().unwrap_or(path);
        Self {
            user: claims.map(|c| c.sub.as_str()),
            can_mark_returned: claims.map(|c| c.has_perm(CAN_MARK_RETURNED)).unwrap_or(false),
            request_path,
            login_url: login_redirect_url(path),
            body,
        }
    }
}

/// Compiled template registry
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();

        for (name, source) in PARTIALS {
            registry
                .register_partial(name, *source)
                .map_err(|e| AppError::Internal(format!("Invalid partial {}: {}", name, e)))?;
        }
        for (name, source) in PAGES {
            registry
                .register_template_string(name, *source)
                .map_err(|e| AppError::Internal(format!("Invalid template {}: {}", name, e)))?;
        }

        tracing::debug!("Registered {} templates", PAGES.len());
        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> AppResult<Html<String>> {
        Ok(Html(self.registry.render(name, data)?))
    }
}

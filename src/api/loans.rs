//! Loan listings and the librarian renewal form

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    forms::{FormErrors, RenewBookForm},
    models::{
        user::{Access, CAN_MARK_RETURNED},
        BookInstance, LoanStatus, PageQuery,
    },
    services::loans::RenewalOutcome,
    templates, AppState,
};

use super::{parse_id, today, Caller};

/// Where a librarian lands after renewing a copy
const ALL_BORROWED_PATH: &str = "/catalog/borrowed";

/// A copy as shown in listings
#[derive(Debug, Clone, Serialize)]
pub struct CopyView {
    pub id: Uuid,
    pub book_id: i32,
    pub book_title: String,
    pub status: LoanStatus,
    pub status_label: &'static str,
    pub due_back: Option<NaiveDate>,
    pub is_overdue: bool,
    pub borrower: Option<String>,
}

impl CopyView {
    pub fn new(instance: BookInstance, today: NaiveDate) -> Self {
        Self {
            is_overdue: instance.is_overdue(today),
            status_label: instance.status.label(),
            id: instance.id,
            book_id: instance.book_id,
            book_title: instance.book_title,
            status: instance.status,
            due_back: instance.due_back,
            borrower: instance.borrower_username,
        }
    }
}

#[derive(Serialize)]
struct RenewView<'a> {
    instance: CopyView,
    form: &'a RenewBookForm,
    errors: FormErrors,
}

/// Copies on loan to the caller
#[utoipa::path(
    get,
    path = "/catalog/mybooks",
    tag = "loans",
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's loans", body = String, content_type = "text/html"),
        (status = 303, description = "Login required"),
        (status = 404, description = "No such page")
    )
)]
pub async fn my_books(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let claims = caller.authorize(Access::Login)?;

    let today = today();
    let page = state
        .services
        .loans
        .borrowed_by(claims.user_id, query.page.as_deref())
        .await?
        .map(|copy| CopyView::new(copy, today));
    caller.render(&state, templates::BORROWED_BY_USER, page)
}

/// Every copy on loan, for librarians
#[utoipa::path(
    get,
    path = "/catalog/borrowed",
    tag = "loans",
    params(PageQuery),
    responses(
        (status = 200, description = "All active loans", body = String, content_type = "text/html"),
        (status = 303, description = "Login required"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "No such page")
    )
)]
pub async fn all_borrowed(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    caller.authorize(Access::Permission(CAN_MARK_RETURNED))?;

    let today = today();
    let page = state
        .services
        .loans
        .all_borrowed(query.page.as_deref())
        .await?
        .map(|copy| CopyView::new(copy, today));
    caller.render(&state, templates::ALL_BORROWED, page)
}

/// Renewal form proposing a due date three weeks out
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/renew",
    tag = "loans",
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Renewal form", body = String, content_type = "text/html"),
        (status = 303, description = "Login required"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renew_form(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    caller.authorize(Access::Permission(CAN_MARK_RETURNED))?;
    let id: Uuid = parse_id(&id, "Copy")?;

    let today = today();
    let instance = state.services.loans.get_instance(id).await?;
    let form = RenewBookForm::initial(today);
    caller.render(
        &state,
        templates::RENEW,
        RenewView {
            instance: CopyView::new(instance, today),
            form: &form,
            errors: FormErrors::new(),
        },
    )
}

/// Move a copy's due date
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/renew",
    tag = "loans",
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body(content = RenewBookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Renewed; redirect to all borrowed copies"),
        (status = 200, description = "Form shown again with errors", body = String, content_type = "text/html"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renew_submit(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Form(form): Form<RenewBookForm>,
) -> AppResult<Response> {
    caller.authorize(Access::Permission(CAN_MARK_RETURNED))?;
    let id: Uuid = parse_id(&id, "Copy")?;

    let today = today();
    match state.services.loans.renew(id, &form, today).await? {
        RenewalOutcome::Renewed { .. } => Ok(Redirect::to(ALL_BORROWED_PATH).into_response()),
        RenewalOutcome::Rejected { instance, errors } => {
            let page = caller.render(
                &state,
                templates::RENEW,
                RenewView {
                    instance: CopyView::new(instance, today),
                    form: &form,
                    errors,
                },
            )?;
            Ok(page.into_response())
        }
    }
}

//! Loan listings and librarian renewals

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::AppResult,
    forms::{FormErrors, RenewBookForm},
    models::{BookInstance, InstanceFilter, Page, Paginator},
    repository::Repository,
};

pub const LOANS_PER_PAGE: Paginator = Paginator::new(10);

/// Result of a renewal submission
#[derive(Debug, Clone, PartialEq)]
pub enum RenewalOutcome {
    Renewed { instance_id: Uuid, due_back: NaiveDate },
    /// Form must be shown again with the errors
    Rejected {
        instance: BookInstance,
        errors: FormErrors,
    },
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Copies on loan to `user_id`, soonest due first
    pub async fn borrowed_by(&self, user_id: i32, page: Option<&str>) -> AppResult<Page<BookInstance>> {
        self.on_loan(InstanceFilter::on_loan(Some(user_id)), page).await
    }

    /// Every copy currently on loan
    pub async fn all_borrowed(&self, page: Option<&str>) -> AppResult<Page<BookInstance>> {
        self.on_loan(InstanceFilter::on_loan(None), page).await
    }

    async fn on_loan(&self, filter: InstanceFilter, page: Option<&str>) -> AppResult<Page<BookInstance>> {
        let total = self.repository.instances.count(filter).await?;
        let window = LOANS_PER_PAGE.window(page, total)?;
        let instances = self
            .repository
            .instances
            .list(filter, window.limit(), window.offset())
            .await?;
        Ok(window.into_page(instances))
    }

    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        self.repository.instances.get_by_id(id).await
    }

    /// Move a copy's due date if the submitted date is acceptable on `today`
    pub async fn renew(&self, id: Uuid, form: &RenewBookForm, today: NaiveDate) -> AppResult<RenewalOutcome> {
        let instance = self.repository.instances.get_by_id(id).await?;

        match form.clean(today) {
            Ok(due_back) => {
                self.repository.instances.set_due_back(id, due_back).await?;
                tracing::info!("Renewed copy {} of book {} until {}", id, instance.book_id, due_back);
                Ok(RenewalOutcome::Renewed {
                    instance_id: id,
                    due_back,
                })
            }
            Err(errors) => {
                tracing::debug!("Rejected renewal of copy {}: {:?}", id, errors);
                Ok(RenewalOutcome::Rejected { instance, errors })
            }
        }
    }
}

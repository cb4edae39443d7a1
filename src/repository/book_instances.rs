//! Book instances (copies) repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{BookInstance, InstanceFilter},
};

use super::BookInstanceStore;

const SELECT_INSTANCE: &str = r#"
    SELECT bi.id, bi.book_id, b.title AS book_title, bi.status, bi.due_back,
           bi.borrower_id, u.username AS borrower_username
    FROM book_instances bi
    JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

/// `$1` is the status code, `$2` the borrower id; NULL disables either test
const FILTER_CLAUSE: &str =
    "($1::varchar IS NULL OR bi.status = $1) AND ($2::int IS NULL OR bi.borrower_id = $2)";

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookInstanceStore for BookInstancesRepository {
    async fn count(&self, filter: InstanceFilter) -> AppResult<i64> {
        let query = format!("SELECT COUNT(*) FROM book_instances bi WHERE {}", FILTER_CLAUSE);
        let count: i64 = sqlx::query_scalar(&query)
            .bind(filter.status)
            .bind(filter.borrower_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self, filter: InstanceFilter, limit: i64, offset: i64) -> AppResult<Vec<BookInstance>> {
        let query = format!(
            "{} WHERE {} ORDER BY bi.due_back ASC NULLS LAST, bi.id LIMIT $3 OFFSET $4",
            SELECT_INSTANCE, FILTER_CLAUSE
        );
        let instances = sqlx::query_as::<_, BookInstance>(&query)
            .bind(filter.status)
            .bind(filter.borrower_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let query = format!(
            "{} WHERE bi.book_id = $1 ORDER BY bi.due_back ASC NULLS LAST, bi.id",
            SELECT_INSTANCE
        );
        let instances = sqlx::query_as::<_, BookInstance>(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        let query = format!("{} WHERE bi.id = $1", SELECT_INSTANCE);
        sqlx::query_as::<_, BookInstance>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }
}

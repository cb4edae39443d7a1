//! Authors repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{Author, AuthorInput},
};

use super::AuthorStore;

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorStore for AuthorsRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT id, first_name, last_name, date_of_birth, date_of_death
            FROM authors
            ORDER BY last_name, first_name, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    async fn list_all(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, date_of_birth, date_of_death FROM authors ORDER BY last_name, first_name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, date_of_birth, date_of_death FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    async fn create(&self, author: &AuthorInput) -> AppResult<Author> {
        let created = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (first_name, last_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, date_of_birth, date_of_death
            "#,
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, id: i32, author: &AuthorInput) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET first_name = $1, last_name = $2, date_of_birth = $3, date_of_death = $4
            WHERE id = $5
            RETURNING id, first_name, last_name, date_of_birth, date_of_death
            "#,
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => AppError::Conflict(
                    format!("Author with id {} still has books in the catalog", id),
                ),
                other => AppError::Database(other),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }
}

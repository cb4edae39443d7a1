//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookInput, BookShort},
};

use super::{contains_pattern, BookStore};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_summary_contains(&self, needle: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE summary ILIKE $1")
            .bind(contains_pattern(needle))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT b.id, b.title, b.author_id,
                   a.first_name AS author_first_name, a.last_name AS author_last_name
            FROM books b
            JOIN authors a ON a.id = b.author_id
            ORDER BY b.title, b.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, summary, author_id FROM books WHERE author_id = $1 ORDER BY title, id",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT id, title, summary, author_id FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn genre_ids(&self, book_id: i32) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT genre_id FROM book_genres WHERE book_id = $1 ORDER BY genre_id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn create(&self, book: &BookInput) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, summary, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, summary, author_id
            "#,
        )
        .bind(&book.title)
        .bind(&book.summary)
        .bind(book.author_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int[]) ON CONFLICT DO NOTHING",
        )
        .bind(created.id)
        .bind(&book.genre_ids[..])
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update(&self, id: i32, book: &BookInput) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, summary = $2, author_id = $3
            WHERE id = $4
            RETURNING id, title, summary, author_id
            "#,
        )
        .bind(&book.title)
        .bind(&book.summary)
        .bind(book.author_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int[]) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(&book.genre_ids[..])
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}

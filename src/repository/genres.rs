//! Genres repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::Genre};

use super::{contains_pattern, GenreStore};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreStore for GenresRepository {
    async fn count_name_contains(&self, needle: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres WHERE name ILIKE $1")
            .bind(contains_pattern(needle))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_all(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    async fn get_many(&self, ids: &[i32]) -> AppResult<Vec<Genre>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let genres = sqlx::query_as::<_, Genre>(
            "SELECT id, name FROM genres WHERE id = ANY($1) ORDER BY name, id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }
}

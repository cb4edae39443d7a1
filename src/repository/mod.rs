//! Repository layer: store traits and their PostgreSQL implementations
//!
//! Handlers and services only see the traits below, bundled in
//! [`Repository`]. [`Repository::postgres`] wires the sqlx-backed stores.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Author, AuthorInput, Book, BookInput, BookInstance, BookShort, Genre, InstanceFilter, User,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    /// Authors ordered by last then first name
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Author>>;

    async fn list_all(&self) -> AppResult<Vec<Author>>;

    /// Fails with `NotFound` when no author has this id
    async fn get_by_id(&self, id: i32) -> AppResult<Author>;

    async fn create(&self, author: &AuthorInput) -> AppResult<Author>;

    async fn update(&self, id: i32, author: &AuthorInput) -> AppResult<Author>;

    /// Fails with `Conflict` while books still reference the author
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    /// Books whose summary contains `needle`, ignoring case
    async fn count_summary_contains(&self, needle: &str) -> AppResult<i64>;

    /// Books ordered by title
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<BookShort>>;

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    async fn genre_ids(&self, book_id: i32) -> AppResult<Vec<i32>>;

    async fn create(&self, book: &BookInput) -> AppResult<Book>;

    async fn update(&self, id: i32, book: &BookInput) -> AppResult<Book>;

    /// Also removes the book's copies and genre links
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenreStore: Send + Sync {
    /// Genres whose name contains `needle`, ignoring case
    async fn count_name_contains(&self, needle: &str) -> AppResult<i64>;

    async fn list_all(&self) -> AppResult<Vec<Genre>>;

    /// Existing genres among `ids`, ordered by name
    async fn get_many(&self, ids: &[i32]) -> AppResult<Vec<Genre>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    async fn count(&self, filter: InstanceFilter) -> AppResult<i64>;

    /// Matching copies ordered by due date (undated last), then id
    async fn list(&self, filter: InstanceFilter, limit: i64, offset: i64) -> AppResult<Vec<BookInstance>>;

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance>;

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Active user with this username, if any
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// User with this id, active or not
    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>>;

    async fn permissions(&self, user_id: i32) -> AppResult<Vec<String>>;
}

/// Bundle of stores injected into the services
#[derive(Clone)]
pub struct Repository {
    pub authors: Arc<dyn AuthorStore>,
    pub books: Arc<dyn BookStore>,
    pub genres: Arc<dyn GenreStore>,
    pub instances: Arc<dyn BookInstanceStore>,
    pub users: Arc<dyn UserStore>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            authors: Arc::new(authors::AuthorsRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            genres: Arc::new(genres::GenresRepository::new(pool.clone())),
            instances: Arc::new(book_instances::BookInstancesRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool)),
        }
    }
}

/// `ILIKE` pattern matching `needle` anywhere, with wildcards escaped
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

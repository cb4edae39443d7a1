//! Read side of the catalog: landing metrics, book and author pages

use std::sync::Arc;

use serde::Serialize;

use crate::{
    error::AppResult,
    models::{
        Author, BookDetails, BookShort, InstanceFilter, LoanStatus, Page, Paginator,
    },
    repository::Repository,
};

use super::sessions::{SessionStore, NUM_VISITS};

pub const BOOKS_PER_PAGE: Paginator = Paginator::new(4);
pub const AUTHORS_PER_PAGE: Paginator = Paginator::new(10);

/// Keyword counted in book summaries and genre names on the landing page
pub const FEATURED_KEYWORD: &str = "action";

/// Counts shown on the landing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LandingMetrics {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_books_contain_action: i64,
    pub num_genres_contain_action: i64,
    /// Visits before this one
    pub num_visits: i64,
}

/// Author with their books
#[derive(Debug, Clone, Serialize)]
pub struct AuthorDetails {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<crate::models::Book>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    sessions: Arc<dyn SessionStore>,
}

impl CatalogService {
    pub fn new(repository: Repository, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    /// Compute landing counts and bump the session's visit counter
    pub async fn landing_metrics(&self, session_id: &str) -> AppResult<LandingMetrics> {
        let num_books = self.repository.books.count().await?;
        let num_instances = self.repository.instances.count(InstanceFilter::all()).await?;
        let num_instances_available = self
            .repository
            .instances
            .count(InstanceFilter::with_status(LoanStatus::Available))
            .await?;
        let num_authors = self.repository.authors.count().await?;
        let num_books_contain_action = self
            .repository
            .books
            .count_summary_contains(FEATURED_KEYWORD)
            .await?;
        let num_genres_contain_action = self
            .repository
            .genres
            .count_name_contains(FEATURED_KEYWORD)
            .await?;

        let num_visits = self
            .sessions
            .get_int(session_id, NUM_VISITS)
            .await?
            .unwrap_or(0);
        self.sessions
            .set_int(session_id, NUM_VISITS, num_visits + 1)
            .await?;

        Ok(LandingMetrics {
            num_books,
            num_instances,
            num_instances_available,
            num_authors,
            num_books_contain_action,
            num_genres_contain_action,
            num_visits,
        })
    }

    pub async fn list_books(&self, page: Option<&str>) -> AppResult<Page<BookShort>> {
        let total = self.repository.books.count().await?;
        let window = BOOKS_PER_PAGE.window(page, total)?;
        let books = self
            .repository
            .books
            .list(window.limit(), window.offset())
            .await?;
        Ok(window.into_page(books))
    }

    pub async fn book_details(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let author = self.repository.authors.get_by_id(book.author_id).await?;
        let genre_ids = self.repository.books.genre_ids(id).await?;
        let genres = self.repository.genres.get_many(&genre_ids).await?;
        let copies = self.repository.instances.list_for_book(id).await?;

        Ok(BookDetails {
            book,
            author,
            genres,
            copies,
        })
    }

    pub async fn list_authors(&self, page: Option<&str>) -> AppResult<Page<Author>> {
        let total = self.repository.authors.count().await?;
        let window = AUTHORS_PER_PAGE.window(page, total)?;
        let authors = self
            .repository
            .authors
            .list(window.limit(), window.offset())
            .await?;
        Ok(window.into_page(authors))
    }

    pub async fn author_details(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetails { author, books })
    }
}

//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{author::Author, book_instance::BookInstance, genre::Genre};

/// Book row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub author_id: i32,
}

/// Short book representation for lists (joined with its author)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub author_first_name: String,
    pub author_last_name: String,
}

/// Book with everything its detail page shows
#[derive(Debug, Clone, Serialize)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub author: Author,
    pub genres: Vec<Genre>,
    pub copies: Vec<BookInstance>,
}

/// Validated book fields ready to be persisted
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub summary: String,
    pub author_id: i32,
    pub genre_ids: Vec<i32>,
}

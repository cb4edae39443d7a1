//! Book create/update form

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Book, BookInput};

use super::{validate_choice_id, FieldSet, FormData, FormErrors, INVALID_CHOICE, REQUIRED};

/// Create and update both expose every book field
pub const BOOK_FIELDS: FieldSet = FieldSet {
    model: "book",
    fields: &["title", "summary", "author", "genre"],
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub title: String,
    #[validate(length(max = 1000, message = "Ensure this value has at most 1000 characters."))]
    pub summary: String,
    /// Author id
    #[validate(custom(function = "validate_choice_id"))]
    pub author: String,
    /// Genre ids (repeatable field)
    pub genre: Vec<String>,
}

impl BookForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            title: data.text("title"),
            summary: data.text("summary"),
            author: data.text("author"),
            genre: data.all("genre"),
        }
    }

    pub fn from_book(book: &Book, genre_ids: &[i32]) -> Self {
        Self {
            title: book.title.clone(),
            summary: book.summary.clone(),
            author: book.author_id.to_string(),
            genre: genre_ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    /// Validate field syntax and convert; whether the referenced author and
    /// genres exist is checked against the store by the caller
    pub fn clean(&self) -> Result<BookInput, FormErrors> {
        let mut errors = self.validate().err().map(FormErrors::from).unwrap_or_default();

        for (field, value) in [
            ("title", &self.title),
            ("summary", &self.summary),
            ("author", &self.author),
        ] {
            if value.trim().is_empty() {
                errors.add(field, REQUIRED);
            }
        }

        let mut genre_ids = Vec::with_capacity(self.genre.len());
        for raw in &self.genre {
            match raw.trim().parse::<i32>() {
                Ok(id) if !genre_ids.contains(&id) => genre_ids.push(id),
                Ok(_) => {}
                Err(_) => {
                    errors.add("genre", INVALID_CHOICE);
                    break;
                }
            }
        }

        errors.into_result()?;

        let author_id = self.author.trim().parse::<i32>().map_err(|_| {
            let mut errors = FormErrors::new();
            errors.add("author", INVALID_CHOICE);
            errors
        })?;

        Ok(BookInput {
            title: self.title.trim().to_string(),
            summary: self.summary.trim().to_string(),
            author_id,
            genre_ids,
        })
    }

    /// Whether `genre_id` is ticked, for re-rendering checkboxes
    pub fn has_genre(&self, genre_id: i32) -> bool {
        self.genre.iter().any(|g| g.trim() == genre_id.to_string())
    }

    pub fn author_id(&self) -> Option<i32> {
        self.author.trim().parse().ok()
    }
}

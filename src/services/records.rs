//! Create, update and delete for authors and books

use crate::{
    error::{AppError, AppResult},
    forms::{AuthorForm, BookForm, FormErrors, INVALID_CHOICE},
    models::{Author, Book, BookInput, Genre},
    repository::Repository,
};

/// Result of a form submission
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome<T> {
    Saved(T),
    /// Nothing was written; show the form again with these errors
    Invalid(FormErrors),
}

/// Options offered by the book form
#[derive(Debug, Clone, Default)]
pub struct BookChoices {
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

#[derive(Clone)]
pub struct RecordsService {
    repository: Repository,
}

impl RecordsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, form: &AuthorForm) -> AppResult<FormOutcome<Author>> {
        let input = match form.clean() {
            Ok(input) => input,
            Err(errors) => return Ok(FormOutcome::Invalid(errors)),
        };

        let author = self.repository.authors.create(&input).await?;
        tracing::info!("Created author {} ({})", author.id, author.display_name());
        Ok(FormOutcome::Saved(author))
    }

    pub async fn update_author(&self, id: i32, form: &AuthorForm) -> AppResult<FormOutcome<Author>> {
        self.repository.authors.get_by_id(id).await?;

        let input = match form.clean() {
            Ok(input) => input,
            Err(errors) => return Ok(FormOutcome::Invalid(errors)),
        };

        let author = self.repository.authors.update(id, &input).await?;
        tracing::info!("Updated author {}", id);
        Ok(FormOutcome::Saved(author))
    }

    /// Refused with `Conflict` while the author still has books
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.get_by_id(id).await?;
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author {}", id);
        Ok(())
    }

    /// Book with the ids of its genres
    pub async fn get_book(&self, id: i32) -> AppResult<(Book, Vec<i32>)> {
        let book = self.repository.books.get_by_id(id).await?;
        let genre_ids = self.repository.books.genre_ids(id).await?;
        Ok((book, genre_ids))
    }

    pub async fn book_choices(&self) -> AppResult<BookChoices> {
        Ok(BookChoices {
            authors: self.repository.authors.list_all().await?,
            genres: self.repository.genres.list_all().await?,
        })
    }

    pub async fn create_book(&self, form: &BookForm) -> AppResult<FormOutcome<Book>> {
        let input = match self.clean_book(form).await? {
            Ok(input) => input,
            Err(errors) => return Ok(FormOutcome::Invalid(errors)),
        };

        let book = self.repository.books.create(&input).await?;
        tracing::info!("Created book {} ({})", book.id, book.title);
        Ok(FormOutcome::Saved(book))
    }

    pub async fn update_book(&self, id: i32, form: &BookForm) -> AppResult<FormOutcome<Book>> {
        self.repository.books.get_by_id(id).await?;

        let input = match self.clean_book(form).await? {
            Ok(input) => input,
            Err(errors) => return Ok(FormOutcome::Invalid(errors)),
        };

        let book = self.repository.books.update(id, &input).await?;
        tracing::info!("Updated book {}", id);
        Ok(FormOutcome::Saved(book))
    }

    /// Copies and genre links go with the book
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.get_by_id(id).await?;
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    /// Form validation plus checks that the chosen author and genres exist
    async fn clean_book(&self, form: &BookForm) -> AppResult<Result<BookInput, FormErrors>> {
        let input = match form.clean() {
            Ok(input) => input,
            Err(errors) => return Ok(Err(errors)),
        };

        let mut errors = FormErrors::new();

        match self.repository.authors.get_by_id(input.author_id).await {
            Ok(_) => {}
            Err(AppError::NotFound(_)) => errors.add("author", INVALID_CHOICE),
            Err(e) => return Err(e),
        }

        if !input.genre_ids.is_empty() {
            let known = self.repository.genres.get_many(&input.genre_ids).await?;
            if known.len() != input.genre_ids.len() {
                errors.add("genre", INVALID_CHOICE);
            }
        }

        Ok(errors.into_result().map(|()| input))
    }
}

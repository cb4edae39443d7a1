//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod page;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorInput};
pub use book::{Book, BookDetails, BookInput, BookShort};
pub use book_instance::{BookInstance, InstanceFilter, LoanStatus};
pub use genre::Genre;
pub use page::{Page, PageQuery, Paginator};
pub use user::{User, UserClaims};

//! In-memory stores and request helpers for router tests

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use catalog_server::{
    config::AppConfig,
    create_router,
    error::{AppError, AppResult},
    models::{
        Author, AuthorInput, Book, BookInput, BookInstance, BookShort, Genre, InstanceFilter,
        LoanStatus, User, UserClaims,
    },
    repository::{AuthorStore, BookInstanceStore, BookStore, GenreStore, Repository, UserStore},
    services::{sessions::SessionStore, Services},
    templates::Templates,
    AppState,
};
use chrono::{NaiveDate, Utc};
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Default)]
struct Data {
    next_id: i32,
    authors: Vec<Author>,
    books: Vec<Book>,
    book_genres: Vec<(i32, i32)>,
    genres: Vec<Genre>,
    instances: Vec<BookInstance>,
    users: Vec<(User, Vec<String>)>,
    sessions: HashMap<String, HashMap<String, i64>>,
}

impl Data {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Every store the server needs, kept in one process-local map
#[derive(Default)]
pub struct MemoryLibrary {
    data: Mutex<Data>,
}

impl MemoryLibrary {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_author(&self, first_name: &str, last_name: &str) -> i32 {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        data.authors.push(Author {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1950, 1, 1).unwrap(),
            date_of_death: None,
        });
        id
    }

    pub fn add_genre(&self, name: &str) -> i32 {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        data.genres.push(Genre {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn add_book(&self, title: &str, summary: &str, author_id: i32) -> i32 {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        data.books.push(Book {
            id,
            title: title.to_string(),
            summary: summary.to_string(),
            author_id,
        });
        id
    }

    pub fn add_copy(
        &self,
        book_id: i32,
        status: LoanStatus,
        due_back: Option<NaiveDate>,
        borrower_id: Option<i32>,
    ) -> Uuid {
        let mut data = self.data.lock().unwrap();
        let book_title = data
            .books
            .iter()
            .find(|b| b.id == book_id)
            .map(|b| b.title.clone())
            .unwrap_or_default();
        let borrower_username = borrower_id.and_then(|id| {
            data.users
                .iter()
                .find(|(u, _)| u.id == id)
                .map(|(u, _)| u.username.clone())
        });
        let id = Uuid::new_v4();
        data.instances.push(BookInstance {
            id,
            book_id,
            book_title,
            status,
            due_back,
            borrower_id,
            borrower_username,
        });
        id
    }

    pub fn add_user(&self, username: &str, password_hash: &str, permissions: &[&str]) -> i32 {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        data.users.push((
            User {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                first_name: String::new(),
                last_name: String::new(),
                is_active: true,
                is_superuser: false,
            },
            permissions.iter().map(|p| p.to_string()).collect(),
        ));
        id
    }

    pub fn revoke_permission(&self, user_id: i32, permission: &str) {
        let mut data = self.data.lock().unwrap();
        if let Some((_, perms)) = data.users.iter_mut().find(|(u, _)| u.id == user_id) {
            perms.retain(|p| p != permission);
        }
    }

    pub fn deactivate_user(&self, user_id: i32) {
        let mut data = self.data.lock().unwrap();
        if let Some((user, _)) = data.users.iter_mut().find(|(u, _)| u.id == user_id) {
            user.is_active = false;
        }
    }

    pub fn copy(&self, id: Uuid) -> Option<BookInstance> {
        self.data.lock().unwrap().instances.iter().find(|i| i.id == id).cloned()
    }

    pub fn author(&self, id: i32) -> Option<Author> {
        self.data.lock().unwrap().authors.iter().find(|a| a.id == id).cloned()
    }

    pub fn authors(&self) -> Vec<Author> {
        self.data.lock().unwrap().authors.clone()
    }

    pub fn book(&self, id: i32) -> Option<Book> {
        self.data.lock().unwrap().books.iter().find(|b| b.id == id).cloned()
    }

    pub fn copies_of(&self, book_id: i32) -> usize {
        self.data
            .lock()
            .unwrap()
            .instances
            .iter()
            .filter(|i| i.book_id == book_id)
            .count()
    }

    pub fn session_value(&self, session_id: &str, key: &str) -> Option<i64> {
        self.data
            .lock()
            .unwrap()
            .sessions
            .get(session_id)
            .and_then(|s| s.get(key).copied())
    }

    fn author_not_found(id: i32) -> AppError {
        AppError::NotFound(format!("Author with id {} not found", id))
    }

    fn book_not_found(id: i32) -> AppError {
        AppError::NotFound(format!("Book with id {} not found", id))
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn window<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

#[async_trait]
impl AuthorStore for MemoryLibrary {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.data.lock().unwrap().authors.len() as i64)
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Author>> {
        Ok(window(AuthorStore::list_all(self).await?, limit, offset))
    }

    async fn list_all(&self) -> AppResult<Vec<Author>> {
        let mut authors = self.data.lock().unwrap().authors.clone();
        authors.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(authors)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        self.author(id).ok_or_else(|| Self::author_not_found(id))
    }

    async fn create(&self, author: &AuthorInput) -> AppResult<Author> {
        let mut data = self.data.lock().unwrap();
        let created = author.clone().into_author(data.next_id());
        data.authors.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, author: &AuthorInput) -> AppResult<Author> {
        let mut data = self.data.lock().unwrap();
        let slot = data
            .authors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Self::author_not_found(id))?;
        *slot = author.clone().into_author(id);
        Ok(slot.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut data = self.data.lock().unwrap();
        if data.books.iter().any(|b| b.author_id == id) {
            return Err(AppError::Conflict(format!(
                "Author {} still has books in the catalog",
                id
            )));
        }
        data.authors.retain(|a| a.id != id);
        Ok(())
    }
}

#[async_trait]
impl BookStore for MemoryLibrary {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.data.lock().unwrap().books.len() as i64)
    }

    async fn count_summary_contains(&self, needle: &str) -> AppResult<i64> {
        let data = self.data.lock().unwrap();
        Ok(data.books.iter().filter(|b| contains_ci(&b.summary, needle)).count() as i64)
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<BookShort>> {
        let data = self.data.lock().unwrap();
        let mut books: Vec<BookShort> = data
            .books
            .iter()
            .map(|b| {
                let author = data.authors.iter().find(|a| a.id == b.author_id);
                BookShort {
                    id: b.id,
                    title: b.title.clone(),
                    author_id: b.author_id,
                    author_first_name: author.map(|a| a.first_name.clone()).unwrap_or_default(),
                    author_last_name: author.map(|a| a.last_name.clone()).unwrap_or_default(),
                }
            })
            .collect();
        books.sort_by(|a, b| (&a.title, a.id).cmp(&(&b.title, b.id)));
        Ok(window(books, limit, offset))
    }

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let data = self.data.lock().unwrap();
        let mut books: Vec<Book> = data
            .books
            .iter()
            .filter(|b| b.author_id == author_id)
            .cloned()
            .collect();
        books.sort_by(|a, b| (&a.title, a.id).cmp(&(&b.title, b.id)));
        Ok(books)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.book(id).ok_or_else(|| Self::book_not_found(id))
    }

    async fn genre_ids(&self, book_id: i32) -> AppResult<Vec<i32>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .book_genres
            .iter()
            .filter(|(b, _)| *b == book_id)
            .map(|(_, g)| *g)
            .collect())
    }

    async fn create(&self, book: &BookInput) -> AppResult<Book> {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        let created = Book {
            id,
            title: book.title.clone(),
            summary: book.summary.clone(),
            author_id: book.author_id,
        };
        data.books.push(created.clone());
        data.book_genres.extend(book.genre_ids.iter().map(|g| (id, *g)));
        Ok(created)
    }

    async fn update(&self, id: i32, book: &BookInput) -> AppResult<Book> {
        let mut data = self.data.lock().unwrap();
        let slot = data
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Self::book_not_found(id))?;
        slot.title = book.title.clone();
        slot.summary = book.summary.clone();
        slot.author_id = book.author_id;
        let updated = slot.clone();

        data.book_genres.retain(|(b, _)| *b != id);
        data.book_genres.extend(book.genre_ids.iter().map(|g| (id, *g)));
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut data = self.data.lock().unwrap();
        data.books.retain(|b| b.id != id);
        data.book_genres.retain(|(b, _)| *b != id);
        data.instances.retain(|i| i.book_id != id);
        Ok(())
    }
}

#[async_trait]
impl GenreStore for MemoryLibrary {
    async fn count_name_contains(&self, needle: &str) -> AppResult<i64> {
        let data = self.data.lock().unwrap();
        Ok(data.genres.iter().filter(|g| contains_ci(&g.name, needle)).count() as i64)
    }

    async fn list_all(&self) -> AppResult<Vec<Genre>> {
        let mut genres = self.data.lock().unwrap().genres.clone();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn get_many(&self, ids: &[i32]) -> AppResult<Vec<Genre>> {
        let mut genres: Vec<Genre> = self
            .data
            .lock()
            .unwrap()
            .genres
            .iter()
            .filter(|g| ids.contains(&g.id))
            .cloned()
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }
}

#[async_trait]
impl BookInstanceStore for MemoryLibrary {
    async fn count(&self, filter: InstanceFilter) -> AppResult<i64> {
        let data = self.data.lock().unwrap();
        Ok(data.instances.iter().filter(|i| filter.matches(i)).count() as i64)
    }

    async fn list(&self, filter: InstanceFilter, limit: i64, offset: i64) -> AppResult<Vec<BookInstance>> {
        let mut instances: Vec<BookInstance> = self
            .data
            .lock()
            .unwrap()
            .instances
            .iter()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        instances.sort_by_key(|i| (i.due_back.is_none(), i.due_back, i.id));
        Ok(window(instances, limit, offset))
    }

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .instances
            .iter()
            .filter(|i| i.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        self.copy(id)
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let mut data = self.data.lock().unwrap();
        let copy = data
            .instances
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;
        copy.due_back = Some(due_back);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryLibrary {
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .users
            .iter()
            .find(|(u, _)| u.username == username && u.is_active)
            .map(|(u, _)| u.clone()))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let data = self.data.lock().unwrap();
        Ok(data.users.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
    }

    async fn permissions(&self, user_id: i32) -> AppResult<Vec<String>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .users
            .iter()
            .find(|(u, _)| u.id == user_id)
            .map(|(_, perms)| perms.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl SessionStore for MemoryLibrary {
    async fn get_int(&self, session_id: &str, key: &str) -> AppResult<Option<i64>> {
        Ok(self.session_value(session_id, key))
    }

    async fn set_int(&self, session_id: &str, key: &str, value: i64) -> AppResult<()> {
        self.data
            .lock()
            .unwrap()
            .sessions
            .entry(session_id.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Router over `library` with default configuration
pub fn app(library: &Arc<MemoryLibrary>) -> Router {
    let config = AppConfig::default();
    let repository = Repository {
        authors: library.clone(),
        books: library.clone(),
        genres: library.clone(),
        instances: library.clone(),
        users: library.clone(),
    };
    let services = Services::new(repository, library.clone(), config.auth.clone());

    create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        templates: Arc::new(Templates::new().unwrap()),
    })
}

/// Signed token for a user, as the login page would issue it
pub fn token_for(user_id: i32, username: &str, permissions: &[&str]) -> String {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: username.to_string(),
        user_id,
        is_superuser: false,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        exp: now + 3600,
        iat: now,
    }
    .create_token(&AppConfig::default().auth.jwt_secret)
    .unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("auth_token={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("auth_token={}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

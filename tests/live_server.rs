//! Tests against a running server with a seeded database, and against the
//! PostgreSQL and Redis instances it is configured with

use catalog_server::{
    config::AppConfig,
    models::{InstanceFilter, LoanStatus},
    repository::Repository,
    services::sessions::{RedisSessionStore, SessionStore, NUM_VISITS},
};
use chrono::NaiveDate;
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080";

/// Client keeping cookies and not following redirects
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

/// Sign in as the seeded librarian
async fn login(client: &Client) {
    let response = client
        .post(format!("{}/accounts/login", BASE_URL))
        .form(&[("username", "librarian"), ("password", "librarian"), ("next", "/catalog")])
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let response = client()
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_ready() {
    let response = client()
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_visit_counter_survives_requests() {
    let client = client();

    let first = client
        .get(format!("{}/catalog", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .expect("Failed to read body");
    assert!(first.contains("You have visited this page 0 times."));

    let second = client
        .get(format!("{}/catalog", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .expect("Failed to read body");
    assert!(second.contains("You have visited this page 1 time."));
}

#[tokio::test]
#[ignore]
async fn test_books_require_login() {
    let response = client()
        .get(format!("{}/catalog/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()["location"],
        "/accounts/login?next=%2Fcatalog%2Fbooks"
    );
}

#[tokio::test]
#[ignore]
async fn test_librarian_sees_all_borrowed() {
    let client = client();
    login(&client).await;

    let response = client
        .get(format!("{}/catalog/borrowed", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("All Borrowed Books"));
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let response = client()
        .post(format!("{}/accounts/login", BASE_URL))
        .form(&[("username", "librarian"), ("password", "wrong")])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("Please try again."));
}

/// Pool on the configured database, migrated
async fn pool() -> PgPool {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().expect("Failed to load configuration");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

async fn insert_id(pool: &PgPool, sql: &str, binds: &[&str]) -> i32 {
    let mut query = sqlx::query_scalar::<_, i32>(sql);
    for value in binds {
        query = query.bind(*value);
    }
    query.fetch_one(pool).await.expect("Failed to insert row")
}

async fn insert_copy(
    pool: &PgPool,
    book_id: i32,
    status: LoanStatus,
    due_back: Option<NaiveDate>,
    borrower_id: Option<i32>,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO book_instances (id, book_id, status, due_back, borrower_id) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(book_id)
    .bind(status.as_str())
    .bind(due_back)
    .bind(borrower_id)
    .execute(pool)
    .await
    .expect("Failed to insert copy");
    id
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
#[ignore]
async fn test_postgres_landing_counts() {
    let pool = pool().await;
    let repository = Repository::postgres(pool.clone());

    let summaries_before = repository.books.count_summary_contains("action").await.unwrap();
    let genres_before = repository.genres.count_name_contains("action").await.unwrap();
    let available = InstanceFilter::with_status(LoanStatus::Available);
    let available_before = repository.instances.count(available).await.unwrap();

    let author = insert_id(
        &pool,
        "INSERT INTO authors (first_name, last_name, date_of_birth) VALUES ($1, 'Counts', '1950-01-01') RETURNING id",
        &["Live"],
    )
    .await;
    let mut genres = Vec::new();
    for name in ["Action & Adventure", "Satire"] {
        genres.push(insert_id(&pool, "INSERT INTO genres (name) VALUES ($1) RETURNING id", &[name]).await);
    }
    let mut books = Vec::new();
    for summary in ["Action-Packed", "an action tale", "ACTION", "reaction", "a quiet book", "act ion"] {
        let sql = format!(
            "INSERT INTO books (title, summary, author_id) VALUES ('Live counts', $1, {}) RETURNING id",
            author
        );
        books.push(insert_id(&pool, &sql, &[summary]).await);
    }
    for status in [LoanStatus::Available, LoanStatus::OnLoan, LoanStatus::Maintenance, LoanStatus::Reserved] {
        insert_copy(&pool, books[0], status, None, None).await;
    }

    let summaries = repository.books.count_summary_contains("action").await.unwrap();
    let genre_count = repository.genres.count_name_contains("action").await.unwrap();
    let available_after = repository.instances.count(available).await.unwrap();

    sqlx::query("DELETE FROM books WHERE id = ANY($1)").bind(books.as_slice()).execute(&pool).await.unwrap();
    sqlx::query("DELETE FROM genres WHERE id = ANY($1)").bind(genres.as_slice()).execute(&pool).await.unwrap();
    sqlx::query("DELETE FROM authors WHERE id = $1").bind(author).execute(&pool).await.unwrap();

    assert_eq!(summaries - summaries_before, 4);
    assert_eq!(genre_count - genres_before, 1);
    assert_eq!(available_after - available_before, 1);
}

#[tokio::test]
#[ignore]
async fn test_postgres_loans_ordered_by_due_date() {
    let pool = pool().await;
    let repository = Repository::postgres(pool.clone());

    let username = format!("live-{}", Uuid::new_v4());
    let reader = insert_id(
        &pool,
        "INSERT INTO users (username, password_hash) VALUES ($1, '') RETURNING id",
        &[username.as_str()],
    )
    .await;
    let author = insert_id(
        &pool,
        "INSERT INTO authors (first_name, last_name, date_of_birth) VALUES ($1, 'Loans', '1950-01-01') RETURNING id",
        &["Live"],
    )
    .await;
    let sql = format!(
        "INSERT INTO books (title, summary, author_id) VALUES ($1, 's', {}) RETURNING id",
        author
    );
    let book = insert_id(&pool, &sql, &["Live loans"]).await;

    let undated = insert_copy(&pool, book, LoanStatus::OnLoan, None, Some(reader)).await;
    let march = insert_copy(&pool, book, LoanStatus::OnLoan, Some(date(2024, 3, 1)), Some(reader)).await;
    let january = insert_copy(&pool, book, LoanStatus::OnLoan, Some(date(2024, 1, 1)), Some(reader)).await;
    insert_copy(&pool, book, LoanStatus::Available, Some(date(2023, 12, 1)), Some(reader)).await;

    let filter = InstanceFilter::on_loan(Some(reader));
    let count = repository.instances.count(filter).await.unwrap();
    let loans = repository.instances.list(filter, 10, 0).await.unwrap();

    sqlx::query("DELETE FROM books WHERE id = $1").bind(book).execute(&pool).await.unwrap();
    sqlx::query("DELETE FROM authors WHERE id = $1").bind(author).execute(&pool).await.unwrap();
    sqlx::query("DELETE FROM users WHERE id = $1").bind(reader).execute(&pool).await.unwrap();

    assert_eq!(count, 3);
    let ids: Vec<Uuid> = loans.iter().map(|copy| copy.id).collect();
    assert_eq!(ids, vec![january, march, undated]);
    assert!(loans.iter().all(|copy| copy.borrower_username.as_deref() == Some(username.as_str())));
}

#[tokio::test]
#[ignore]
async fn test_redis_session_counter_reuses_connection() {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().expect("Failed to load configuration");
    let store = RedisSessionStore::new(&config.redis.url, 60)
        .await
        .expect("Failed to connect to Redis");
    let session = Uuid::new_v4().to_string();

    assert_eq!(store.get_int(&session, NUM_VISITS).await.unwrap(), None);
    for visits in 1..=20 {
        store.set_int(&session, NUM_VISITS, visits).await.unwrap();
        assert_eq!(store.get_int(&session, NUM_VISITS).await.unwrap(), Some(visits));
    }

    let cloned = store.clone();
    assert_eq!(cloned.get_int(&session, NUM_VISITS).await.unwrap(), Some(20));
    cloned.ping().await.unwrap();
}

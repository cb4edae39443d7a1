//! Visitor sessions: small integer values kept per session id

use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};

use crate::error::{AppError, AppResult};

/// Session key holding the landing-page visit counter
pub const NUM_VISITS: &str = "num_visits";

/// Per-session storage, keyed by an opaque session id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_int(&self, session_id: &str, key: &str) -> AppResult<Option<i64>>;

    /// Store `value` and push the session's expiry forward
    async fn set_int(&self, session_id: &str, key: &str, value: i64) -> AppResult<()>;

    async fn ping(&self) -> AppResult<()>;
}

/// Sessions stored as Redis hashes named `session:{id}`
///
/// All requests share one multiplexed connection, re-established by the
/// manager after a failure.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// Create a new Redis session store and check the server answers
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        let store = Self { conn, ttl_seconds };
        store.ping().await?;
        Ok(store)
    }

    fn key(session_id: &str) -> String {
        format!("session:{}", session_id)
    }

    fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get_int(&self, session_id: &str, key: &str) -> AppResult<Option<i64>> {
        let mut conn = self.connection();

        redis::cmd("HGET")
            .arg(Self::key(session_id))
            .arg(key)
            .query_async::<_, Option<i64>>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read session from Redis: {}", e)))
    }

    async fn set_int(&self, session_id: &str, key: &str, value: i64) -> AppResult<()> {
        let mut conn = self.connection();
        let redis_key = Self::key(session_id);

        redis::pipe()
            .atomic()
            .cmd("HSET")
            .arg(&redis_key)
            .arg(key)
            .arg(value)
            .ignore()
            .cmd("EXPIRE")
            .arg(&redis_key)
            .arg(self.ttl_seconds)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write session to Redis: {}", e)))
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection();

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;
        Ok(())
    }
}

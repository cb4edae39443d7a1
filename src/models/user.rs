//! User model, JWT claims and access checks

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, AppResult};

/// Permission required to renew copies and see every active loan
pub const CAN_MARK_RETURNED: &str = "catalog.can_mark_returned";

/// User account from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub is_superuser: bool,
    /// Granted permission codenames, e.g. `catalog.can_mark_returned`
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Superusers hold every permission
    pub fn has_perm(&self, perm: &str) -> bool {
        self.is_superuser || self.permissions.iter().any(|p| p == perm)
    }
}

/// What a handler requires from its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any authenticated user
    Login,
    /// An authenticated user holding the named permission
    Permission(&'static str),
}

/// Allow or deny `caller` for `access`.
///
/// Anonymous callers get [`AppError::LoginRequired`] pointing back at `next`;
/// authenticated callers missing a permission get [`AppError::Authorization`].
pub fn authorize<'a>(
    caller: Option<&'a UserClaims>,
    access: Access,
    next: &str,
) -> AppResult<&'a UserClaims> {
    let claims = caller.ok_or_else(|| AppError::LoginRequired {
        next: next.to_string(),
    })?;

    match access {
        Access::Login => Ok(claims),
        Access::Permission(perm) if claims.has_perm(perm) => Ok(claims),
        Access::Permission(perm) => Err(AppError::Authorization(format!(
            "User {} lacks permission {}",
            claims.sub, perm
        ))),
    }
}

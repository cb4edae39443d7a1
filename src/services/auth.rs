//! Sign-in against stored argon2 hashes and JWT issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{User, UserClaims},
    repository::Repository,
};

const INVALID_CREDENTIALS: &str = "Your username and password didn't match. Please try again.";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and return a JWT with the user's claims
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, UserClaims)> {
        let user = self
            .repository
            .users
            .get_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !self.verify_password(&user, password)? {
            tracing::warn!("Failed login for {}", user.username);
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let permissions = self.repository.users.permissions(user.id).await?;
        let claims = self.claims_for(&user, permissions);
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!("User {} logged in", user.username);
        Ok((token, claims))
    }

    /// Claims from a token; `None` when it is missing, expired or forged
    pub fn decode_token(&self, token: &str) -> Option<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret).ok()
    }

    /// Caller behind `token`, with the account's current state and grants.
    ///
    /// `None` when the token does not decode or the account is gone or
    /// deactivated.
    pub async fn resolve_token(&self, token: &str) -> AppResult<Option<UserClaims>> {
        let Some(claims) = self.decode_token(token) else {
            return Ok(None);
        };

        let user = match self.repository.users.get_by_id(claims.user_id).await? {
            Some(user) if user.is_active => user,
            _ => {
                tracing::debug!("Token for inactive or removed user {}", claims.user_id);
                return Ok(None);
            }
        };

        let permissions = self.repository.users.permissions(user.id).await?;
        Ok(Some(UserClaims {
            sub: user.username,
            is_superuser: user.is_superuser,
            permissions,
            ..claims
        }))
    }

    fn claims_for(&self, user: &User, permissions: Vec<String>) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            is_superuser: user.is_superuser,
            permissions,
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        }
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}

//! Business logic services

pub mod auth;
pub mod catalog;
pub mod loans;
pub mod records;
pub mod sessions;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Repository};

use sessions::SessionStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub records: records::RecordsService,
    pub sessions: Arc<dyn SessionStore>,
}

impl Services {
    /// Create all services over the given stores
    pub fn new(repository: Repository, sessions: Arc<dyn SessionStore>, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone(), sessions.clone()),
            loans: loans::LoansService::new(repository.clone()),
            records: records::RecordsService::new(repository),
            sessions,
        }
    }
}

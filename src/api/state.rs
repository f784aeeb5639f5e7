//! Application state shared by every handler.

use std::sync::Arc;

use crate::infra::{Cache, Database};
use crate::services::{
    AuthService, PasswordResetService, ServiceContainer, UserService, WithdrawalService,
};

/// Application state (DI container).
///
/// Handlers only see the service traits. `cache` and `database` are
/// optional so the router can be embedded over the in-memory store; without
/// a cache no throttling is applied.
#[derive(Clone)]
pub struct AppState {
    services: Arc<dyn ServiceContainer>,
    /// Redis cache backing the rate limiter
    pub cache: Option<Arc<Cache>>,
    /// Database handle used by the health check
    pub database: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(services: Arc<dyn ServiceContainer>) -> Self {
        Self {
            services,
            cache: None,
            database: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }

    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.services.auth()
    }

    pub fn users(&self) -> Arc<dyn UserService> {
        self.services.users()
    }

    pub fn password_reset(&self) -> Arc<dyn PasswordResetService> {
        self.services.password_reset()
    }

    pub fn withdrawals(&self) -> Arc<dyn WithdrawalService> {
        self.services.withdrawals()
    }
}

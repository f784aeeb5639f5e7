//! Service Container - Centralized service access.
//!
//! Handlers depend on the service traits; the container decides which
//! implementations and which store back them.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, Notifier, PasswordResetManager, PasswordResetService, UserManager,
    UserService, WithdrawalManager, WithdrawalService,
};
use crate::config::Config;
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn password_reset(&self) -> Arc<dyn PasswordResetService>;

    fn withdrawals(&self) -> Arc<dyn WithdrawalService>;
}

#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    password_reset_service: Arc<dyn PasswordResetService>,
    withdrawal_service: Arc<dyn WithdrawalService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        password_reset_service: Arc<dyn PasswordResetService>,
        withdrawal_service: Arc<dyn WithdrawalService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            password_reset_service,
            withdrawal_service,
        }
    }

    /// Wire every service over one store and one notifier.
    pub fn from_store<U>(uow: Arc<U>, notifier: Arc<dyn Notifier>, config: &Config) -> Self
    where
        U: UnitOfWork + 'static,
    {
        Self {
            auth_service: Arc::new(Authenticator::new(
                uow.clone(),
                notifier.clone(),
                config.jwt.clone(),
            )),
            user_service: Arc::new(UserManager::new(uow.clone())),
            password_reset_service: Arc::new(PasswordResetManager::new(
                uow.clone(),
                notifier.clone(),
                config.app_base_url.clone(),
                config.reset_token_ttl_seconds,
            )),
            withdrawal_service: Arc::new(WithdrawalManager::new(
                uow,
                notifier,
                config.mail.support_email.clone(),
            )),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn password_reset(&self) -> Arc<dyn PasswordResetService> {
        self.password_reset_service.clone()
    }

    fn withdrawals(&self) -> Arc<dyn WithdrawalService> {
        self.withdrawal_service.clone()
    }
}

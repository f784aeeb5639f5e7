//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure through the
//! Unit of Work and the injected notifier.

mod auth_service;
pub mod container;
pub mod emails;
mod notification;
mod password_reset;
mod user_service;
mod withdrawal;

pub use container::{ServiceContainer, Services};

pub use auth_service::{AuthService, AuthSession, Authenticator, Claims, TokenResponse};
pub use notification::{notify, DirectNotifier, Notifier, QueuedNotifier};
pub use password_reset::{PasswordResetManager, PasswordResetService};
pub use user_service::{UserManager, UserService};
pub use withdrawal::{WithdrawalManager, WithdrawalReceipt, WithdrawalService};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use notification::MockNotifier;
#[cfg(any(test, feature = "test-utils"))]
pub use password_reset::MockPasswordResetService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
#[cfg(any(test, feature = "test-utils"))]
pub use withdrawal::MockWithdrawalService;

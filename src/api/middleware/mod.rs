//! API middleware.

mod auth;
mod rate_limit;

pub use auth::{admin_middleware, auth_middleware, require_admin, CurrentUser};
pub use rate_limit::{rate_limit_auth_middleware, rate_limit_middleware, RateLimitError};

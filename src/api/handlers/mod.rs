//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod password_handler;
pub mod user_handler;
pub mod withdrawal_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::auth_routes;
pub use password_handler::{forgot_password_routes, reset_password_routes};
pub use user_handler::user_routes;
pub use withdrawal_handler::withdrawal_routes;

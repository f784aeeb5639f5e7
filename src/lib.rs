//! CoinBlazers account backend.
//!
//! Accounts with a monetary balance, withdrawals recorded in a ledger and
//! emailed password-reset links.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and rules
//! - **services**: Use cases (auth, profiles, password reset, withdrawals)
//! - **infra**: Postgres, in-memory store, Redis, mail transport
//! - **jobs**: Email queue handled by the worker
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared request/response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! coinblazers-api serve
//! coinblazers-api migrate up
//! coinblazers-api jobs work
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use domain::{Amount, Password, User, UserRole};
pub use errors::{AppError, AppResult};

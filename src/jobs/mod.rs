//! Background jobs processed by the `jobs work` command.

mod email_job;
mod queue;

pub use email_job::{email_job_handler, EmailJob};
pub use queue::email_storage;

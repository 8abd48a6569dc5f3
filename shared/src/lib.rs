// shared/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("target '{0}' is not configured")]
    NotConfigured(String),
    #[error("{target} invalidation failed: {message}")]
    Invalidator { target: String, message: String },
    #[error("webhook notification failed: {0}")]
    Notification(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalidator(target: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Invalidator {
            target: target.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;

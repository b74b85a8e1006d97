//! Service-layer error taxonomy.
//!
//! Mutation and query services return a closed set of error kinds so the
//! HTTP layer can map them onto status codes without string matching:
//! validation -> 400, not-found -> 404, capacity -> 400, everything else
//! -> 500. Only the boot migration catches errors and continues.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or malformed. The message is shown
    /// to the admin as-is.
    #[error("{0}")]
    Validation(String),

    /// A referenced row does not exist.
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: i64 },

    /// The slideshow is full.
    #[error("{0}")]
    Capacity(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid portfolio data: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn not_found(what: &'static str, id: i64) -> Self {
        Error::NotFound { what, id }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

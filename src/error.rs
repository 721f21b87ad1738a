use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to convert {filename}: {message}")]
    Parse { filename: String, message: String },

    #[error("Index write error: {0}")]
    IndexWrite(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid query: {0}")]
    Query(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Failed to watch {}: {message}", path.display())]
    WatchRegistration { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for the expected "no such recipe" outcome of a lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Get a short error message safe for logging
    /// Index internals are collapsed into a generic message
    pub fn log_safe(&self) -> String {
        match self {
            Error::FileRead { path, .. } => format!("Failed to read {}", path.display()),
            Error::Parse { filename, message } => {
                format!("Failed to convert {filename}: {message}")
            }
            Error::IndexWrite(_) => "Search index write failed".to_string(),
            Error::Search(_) => "Search index error".to_string(),
            Error::Io(_) => "File system operation failed".to_string(),
            Error::Json(_) => "Serialization failed".to_string(),
            Error::NotFound(msg) => format!("Not found: {msg}"),
            Error::Query(msg) => format!("Invalid query: {msg}"),
            Error::WatchRegistration { path, .. } => {
                format!("Failed to watch {}", path.display())
            }
            Error::Config(msg) => format!("Configuration error: {msg}"),
            Error::Validation(msg) => format!("Validation error: {msg}"),
        }
    }
}

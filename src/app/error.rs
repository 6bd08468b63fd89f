use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no feed discovered for {0}")]
    FeedNotFound(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("post link is required")]
    MissingLink,

    #[error("Store lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

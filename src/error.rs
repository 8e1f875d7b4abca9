use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhaseLensError {
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("The encoding should have been 'gzip' but it is instead {}", .0.as_deref().unwrap_or("none"))]
    UnexpectedEncoding(Option<String>),

    #[error("Log cache error: {0}")]
    Cache(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PhaseLensError {
    /// Whether the error comes from the connection itself: refused, reset, or
    /// closed before a response arrived. HTTP status and body errors do not count.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Network(e) => e.is_connect() || (e.is_request() && e.status().is_none()),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PhaseLensError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog API error: status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Parsing error: {message}")]
    Parse { message: String },
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

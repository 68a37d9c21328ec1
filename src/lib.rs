pub mod catalog;
pub mod config;
pub mod models;
pub mod reconciler;
pub mod scraper;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;

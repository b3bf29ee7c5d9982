pub mod compose;
pub mod config;
pub mod fetch;
pub mod models;
pub mod notify;
pub mod policy;
pub mod scheduler;
pub mod storage;
pub mod utils;
pub mod worker;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;

pub mod change_detector;
pub mod classifier;
pub mod config;
pub mod fetcher;
pub mod models;
pub mod notifier;
pub mod runner;
pub mod status_store;
pub mod utils;

// Re-export commonly used types
pub use classifier::AvailabilityClassifier;
pub use config::AppConfig;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use models::{ChangeEvent, Product, StatusLabel};
pub use runner::{RunOptions, RunReport, Runner};
pub use status_store::StatusStore;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;

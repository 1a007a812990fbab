pub mod error;
pub mod logger;
pub mod token_estimator;

pub use error::AppError;

//! Convenience result type alias for Encore.

use crate::error::AppError;

/// A specialized `Result` type for Encore operations.
pub type AppResult<T> = Result<T, AppError>;

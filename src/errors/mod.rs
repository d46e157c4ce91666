//! Centralized error handling for the stream curator
//!
//! # Error Categories
//!
//! - **Fatal errors** (`AppError`): configuration, candidate ingestion,
//!   output writing. These abort the run.
//! - **Candidate rejections** (`CandidateRejection`): one candidate is
//!   dropped and the run continues.
//!
//! # Usage
//!
//! ```rust
//! use stream_curator::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("max_concurrency must be greater than 0"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Outcome of evaluating a single candidate
pub type EvaluationResult<T> = Result<T, CandidateRejection>;

//! Candidate evaluation pipeline
//!
//! - **CandidateEvaluator**: probe -> sample -> score -> classify for one
//!   candidate
//! - **HealthCheckCoordinator**: runs the evaluator over a batch with a
//!   concurrency cap and whole-run cancellation

pub mod coordinator;
pub mod evaluator;

pub use coordinator::{HealthCheckCoordinator, RunReport, RunStats};
pub use evaluator::CandidateEvaluator;

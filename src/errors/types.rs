//! Error type definitions for the stream curator
//!
//! Two families live here. `AppError` and its children are fatal: they abort
//! the run with a non-zero exit. `CandidateRejection` is the per-candidate
//! taxonomy; a rejection drops one candidate and the run carries on.

use thiserror::Error;

/// Top-level application error type
///
/// Anything that surfaces as an `AppError` ends the run. Per-candidate
/// failures never become an `AppError`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Candidate ingestion errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The output playlist could not be produced or written
    #[error("Output error: {path} - {message}")]
    Output { path: String, message: String },

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Candidate source specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network connection timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// HTTP errors from external sources
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// Transport or read failures
    #[error("Fetch failed: {url} - {message}")]
    FetchFailed { url: String, message: String },

    /// Nothing to ingest
    #[error("No sources configured")]
    NoSources,

    /// Every configured source failed to load
    #[error("All {count} sources failed to load")]
    AllSourcesFailed { count: usize },

    /// Sources loaded but yielded no candidates
    #[error("Sources yielded no candidates")]
    NoCandidates,
}

/// Why a single candidate produced no result
///
/// Every variant leads to the same outcome (the candidate is dropped), but
/// they stay distinct so logs and run statistics can tell them apart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CandidateRejection {
    /// Display name matched an ad/promo keyword; not an error
    #[error("Filtered as noise: matched keyword '{keyword}'")]
    Noise { keyword: String },

    /// Every probe attempt failed or timed out
    #[error("Unreachable after {attempts} probe attempts")]
    Unreachable { attempts: usize },

    /// Throughput or resolution could not be measured
    #[error("Quality sampling failed: {reason}")]
    SampleFailed { reason: String },

    /// The metadata probe process failed
    #[error("External probe failed: {reason}")]
    ExternalProbeFailure { reason: String },

    /// Scored, but under the acceptance threshold
    #[error("Score {score} below threshold {threshold}")]
    BelowThreshold { score: u32, threshold: u32 },

    /// Abandoned because the run was cancelled
    #[error("Cancelled before evaluation completed")]
    Cancelled,
}

impl CandidateRejection {
    /// Stable label for logs and counters
    pub fn kind(&self) -> &'static str {
        match self {
            CandidateRejection::Noise { .. } => "noise",
            CandidateRejection::Unreachable { .. } => "unreachable",
            CandidateRejection::SampleFailed { .. } => "sample_failed",
            CandidateRejection::ExternalProbeFailure { .. } => "external_probe_failure",
            CandidateRejection::BelowThreshold { .. } => "below_threshold",
            CandidateRejection::Cancelled => "cancelled",
        }
    }

    /// Intentional exclusions are not failures
    pub fn is_failure(&self) -> bool {
        !matches!(self, CandidateRejection::Noise { .. })
    }

    pub fn sample_failed<S: Into<String>>(reason: S) -> Self {
        Self::SampleFailed {
            reason: reason.into(),
        }
    }
}

/// Errors from the external width probe
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WidthProbeError {
    /// The probe binary could not be started
    #[error("Failed to execute {command}: {message}")]
    Spawn { command: String, message: String },

    /// The probe did not finish in time and was killed
    #[error("Probe timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Non-zero exit
    #[error("Probe exited with {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },

    /// Exit 0 but stdout was not a positive integer
    #[error("Unparseable probe output: '{output}'")]
    InvalidOutput { output: String },
}

impl From<WidthProbeError> for CandidateRejection {
    fn from(err: WidthProbeError) -> Self {
        match err {
            WidthProbeError::InvalidOutput { .. } => CandidateRejection::SampleFailed {
                reason: err.to_string(),
            },
            other => CandidateRejection::ExternalProbeFailure {
                reason: other.to_string(),
            },
        }
    }
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an output error for a path
    pub fn output<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::Output {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create a timeout error
    pub fn timeout<U: Into<String>>(url: U) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create a fetch failure
    pub fn fetch_failed<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::FetchFailed {
            url: url.into(),
            message: message.into(),
        }
    }
}

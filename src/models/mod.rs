//! Records flowing through the curation pipeline
//!
//! Candidate -> ProbeSample -> QualitySignal -> EvaluatedChannel ->
//! CuratedPlaylist. Nothing here outlives a single run.

use std::collections::HashMap;

/// An unverified (name, URL) pair pending evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub display_name: String,
    pub endpoint_url: String,
}

impl Candidate {
    pub fn new<N: Into<String>, U: Into<String>>(display_name: N, endpoint_url: U) -> Self {
        Self {
            display_name: display_name.into(),
            endpoint_url: endpoint_url.into(),
        }
    }
}

/// Liveness measurement from one or more successful probe attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeSample {
    /// Mean elapsed time of the successful attempts
    pub mean_latency_seconds: f64,
    pub successful_attempts: usize,
}

/// Measured quality of a reachable endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualitySignal {
    /// Pixel width of the first video stream
    pub width_pixels: u32,
    pub bitrate_bytes_per_second: f64,
}

/// A candidate that passed every stage and met the score threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatedChannel {
    pub name: String,
    pub url: String,
    pub category: String,
    pub score: u32,
    pub logo_url: String,
}

/// Deduplicated, ranked, capped channels keyed by category
///
/// Each bucket is sorted by score descending. Bucket iteration order is
/// unspecified; the emitter imposes the declared category order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CuratedPlaylist {
    categories: HashMap<String, Vec<EvaluatedChannel>>,
}

impl CuratedPlaylist {
    pub fn new(categories: HashMap<String, Vec<EvaluatedChannel>>) -> Self {
        Self { categories }
    }

    /// Channels retained for `category`, best first
    pub fn channels(&self, category: &str) -> &[EvaluatedChannel] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn channel_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.channel_count() == 0
    }
}

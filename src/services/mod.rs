//! Service layer for candidate evaluation
//!
//! Each service handles one step of judging a candidate:
//!
//! - **NoiseFilter**: drops ad/promo entries by display name
//! - **ProbeClient**: multi-region reachability and latency
//! - **QualitySampler**: segment throughput and video width
//! - **Scorer**: turns measurements into a 0-80 score
//! - **ChannelClassifier**: keyword-based category assignment
//! - **Curator**: dedup, grouping, ranking and per-category cap
//!
//! Orchestration across candidates lives in [`crate::pipeline`].

pub mod classifier;
pub mod curator;
pub mod noise_filter;
pub mod probe_client;
pub mod quality_sampler;
pub mod scorer;
pub mod stream_prober;

pub use classifier::ChannelClassifier;
pub use curator::Curator;
pub use noise_filter::NoiseFilter;
pub use probe_client::ProbeClient;
pub use quality_sampler::QualitySampler;
pub use scorer::{score, ScoreGate, MAX_SCORE};
pub use stream_prober::{FfprobeWidthProbe, WidthProbe};

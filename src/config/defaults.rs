/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Source defaults
pub const DEFAULT_SOURCE_FETCH_TIMEOUT_SECS: u64 = 10;

// Probe defaults
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PREFIX_BYTES: usize = 1024;
pub const DEFAULT_PROBE_REGIONS: &[&str] = &["asia", "eu", "us"];

// Sampler defaults
pub const DEFAULT_MANIFEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SEGMENT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_FFPROBE_COMMAND: &str = "ffprobe";
pub const DEFAULT_FFPROBE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MIN_MEASURABLE_ELAPSED_MS: u64 = 1;

// Scoring defaults
pub const DEFAULT_SCORE_THRESHOLD: u32 = 80;

// Curation defaults
pub const DEFAULT_MAX_PER_CATEGORY: usize = 5;
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

// Classification defaults
pub const DEFAULT_CATEGORY: &str = "Other";
pub const DEFAULT_NOISE_KEYWORDS: &[&str] = &["购物", "广告", "promo", "shop", "试看"];

// Output defaults
pub const DEFAULT_OUTPUT_PATH: &str = "./output.m3u";
pub const DEFAULT_LOGO_URL_TEMPLATE: &str = "https://logo.clearbit.com/{name}.com";

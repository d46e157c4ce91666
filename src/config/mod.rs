use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub curation: CurationConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where candidate manifests come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Manifest URLs or local paths
    #[serde(default)]
    pub urls: Vec<String>,
    /// Optional file listing one manifest per line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_file: Option<PathBuf>,
    #[serde(default = "default_source_fetch_timeout", with = "duration_serde::duration")]
    pub fetch_timeout: Duration,
}

/// One network vantage point for liveness probing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRegion {
    pub name: String,
    /// HTTP proxy the region's attempts are routed through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_attempt_timeout", with = "duration_serde::duration")]
    pub attempt_timeout: Duration,
    /// Bytes read from the body before an attempt counts as live
    #[serde(default = "default_prefix_bytes")]
    pub prefix_bytes: usize,
    #[serde(default = "default_probe_regions")]
    pub regions: Vec<ProbeRegion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    #[serde(default = "default_manifest_timeout", with = "duration_serde::duration")]
    pub manifest_timeout: Duration,
    #[serde(default = "default_segment_timeout", with = "duration_serde::duration")]
    pub segment_timeout: Duration,
    #[serde(default = "default_ffprobe_command")]
    pub ffprobe_command: String,
    #[serde(default = "default_ffprobe_timeout", with = "duration_serde::duration")]
    pub ffprobe_timeout: Duration,
    /// Segment downloads faster than this cannot yield a meaningful bitrate
    #[serde(default = "default_min_measurable_elapsed", with = "duration_serde::duration")]
    pub min_measurable_elapsed: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Inclusive acceptance bar; 80 is the rubric maximum
    #[serde(default = "default_score_threshold")]
    pub threshold: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationConfig {
    #[serde(default = "default_max_per_category")]
    pub max_per_category: usize,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Abandon every in-flight candidate after this long
    #[serde(
        default,
        with = "duration_serde::option_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub run_timeout: Option<Duration>,
}

/// Keyword rule mapping display names onto a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default = "default_noise_keywords")]
    pub noise_keywords: Vec<String>,
    /// Evaluated in order; first match wins. Also the output block order.
    #[serde(default = "default_category_rules")]
    pub rules: Vec<CategoryRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    /// `{name}` is replaced by the whitespace-stripped display name
    #[serde(default = "default_logo_url_template")]
    pub logo_url_template: String,
}

fn default_source_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_SOURCE_FETCH_TIMEOUT_SECS)
}

fn default_attempt_timeout() -> Duration {
    Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS)
}

fn default_prefix_bytes() -> usize {
    DEFAULT_PREFIX_BYTES
}

fn default_probe_regions() -> Vec<ProbeRegion> {
    DEFAULT_PROBE_REGIONS
        .iter()
        .map(|name| ProbeRegion {
            name: name.to_string(),
            proxy: None,
        })
        .collect()
}

fn default_manifest_timeout() -> Duration {
    Duration::from_secs(DEFAULT_MANIFEST_TIMEOUT_SECS)
}

fn default_segment_timeout() -> Duration {
    Duration::from_secs(DEFAULT_SEGMENT_TIMEOUT_SECS)
}

fn default_ffprobe_command() -> String {
    DEFAULT_FFPROBE_COMMAND.to_string()
}

fn default_ffprobe_timeout() -> Duration {
    Duration::from_secs(DEFAULT_FFPROBE_TIMEOUT_SECS)
}

fn default_min_measurable_elapsed() -> Duration {
    Duration::from_millis(DEFAULT_MIN_MEASURABLE_ELAPSED_MS)
}

fn default_score_threshold() -> u32 {
    DEFAULT_SCORE_THRESHOLD
}

fn default_max_per_category() -> usize {
    DEFAULT_MAX_PER_CATEGORY
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_category_rules() -> Vec<CategoryRule> {
    let rule = |category: &str, keywords: &[&str]| CategoryRule {
        category: category.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    };

    vec![
        rule("News", &["cctv", "news", "新闻"]),
        rule("Satellite", &["卫视", "satellite"]),
        rule("Movies", &["电影", "movie", "影院", "cinema"]),
        rule("Loop", &["轮播", "测试", "loop"]),
        rule("Kids", &["少儿", "动漫", "kid", "cartoon"]),
    ]
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_noise_keywords() -> Vec<String> {
    DEFAULT_NOISE_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

fn default_logo_url_template() -> String {
    DEFAULT_LOGO_URL_TEMPLATE.to_string()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            list_file: None,
            fetch_timeout: default_source_fetch_timeout(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: default_attempt_timeout(),
            prefix_bytes: default_prefix_bytes(),
            regions: default_probe_regions(),
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            manifest_timeout: default_manifest_timeout(),
            segment_timeout: default_segment_timeout(),
            ffprobe_command: default_ffprobe_command(),
            ffprobe_timeout: default_ffprobe_timeout(),
            min_measurable_elapsed: default_min_measurable_elapsed(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: default_score_threshold(),
        }
    }
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            max_per_category: default_max_per_category(),
            max_concurrency: default_max_concurrency(),
            run_timeout: None,
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            default_category: default_category(),
            noise_keywords: default_noise_keywords(),
            rules: default_category_rules(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            logo_url_template: default_logo_url_template(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: SourcesConfig::default(),
            probe: ProbeConfig::default(),
            sampler: SamplerConfig::default(),
            scoring: ScoringConfig::default(),
            curation: CurationConfig::default(),
            classification: ClassificationConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(config_file: &str) -> AppResult<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents).map_err(|e| {
                AppError::configuration(format!("Failed to parse {config_file}: {e}"))
            })
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config).map_err(|e| {
                AppError::configuration(format!("Failed to render default config: {e}"))
            })?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> AppResult<()> {
        if self.curation.max_concurrency == 0 {
            return Err(AppError::configuration(
                "curation.max_concurrency must be greater than 0",
            ));
        }
        if self.curation.max_per_category == 0 {
            return Err(AppError::configuration(
                "curation.max_per_category must be greater than 0",
            ));
        }
        if self.probe.regions.is_empty() {
            return Err(AppError::configuration(
                "probe.regions must name at least one region",
            ));
        }
        if self.probe.prefix_bytes == 0 {
            return Err(AppError::configuration(
                "probe.prefix_bytes must be greater than 0",
            ));
        }
        if self.classification.default_category.trim().is_empty() {
            return Err(AppError::configuration(
                "classification.default_category must not be empty",
            ));
        }
        if !self.output.logo_url_template.contains("{name}") {
            return Err(AppError::configuration(
                "output.logo_url_template must contain a {name} placeholder",
            ));
        }
        Ok(())
    }
}

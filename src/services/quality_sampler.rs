//! Throughput and resolution sampling
//!
//! Throughput comes from downloading one media segment referenced by the
//! endpoint's playlist and timing it. Resolution comes from the `WidthProbe`.
//! Both are required; either failing drops the candidate.

use futures::StreamExt;
use m3u8_rs::Playlist;
use regex::Regex;
use reqwest::Client;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::config::SamplerConfig;
use crate::errors::{AppError, AppResult, CandidateRejection, EvaluationResult};
use crate::models::QualitySignal;
use crate::services::stream_prober::WidthProbe;
use crate::utils::human_format::{format_bitrate, format_duration_precise};
use crate::utils::UrlUtils;

/// Maximum bytes read from a playlist body
pub const MAX_PLAYLIST_BYTES: usize = 256 * 1024;

/// What a playlist body points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentReference {
    /// A media segment, ready to download
    Segment(String),
    /// A variant playlist that has to be fetched first
    Variant(String),
}

pub struct QualitySampler {
    client: Client,
    width_probe: Arc<dyn WidthProbe>,
    manifest_timeout: Duration,
    segment_timeout: Duration,
    min_measurable_elapsed: Duration,
}

impl QualitySampler {
    pub fn new(config: &SamplerConfig, width_probe: Arc<dyn WidthProbe>) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.manifest_timeout)
            .no_proxy()
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            width_probe,
            manifest_timeout: config.manifest_timeout,
            segment_timeout: config.segment_timeout,
            min_measurable_elapsed: config.min_measurable_elapsed,
        })
    }

    /// Measure bitrate, then width
    pub async fn sample(&self, url: &str) -> EvaluationResult<QualitySignal> {
        let segment_url = self.locate_segment(url).await?;
        let bitrate = self.measure_throughput(&segment_url).await?;
        let width = self.width_probe.probe_width(url).await?;

        Ok(QualitySignal {
            width_pixels: width,
            bitrate_bytes_per_second: bitrate,
        })
    }

    /// Follow at most one master -> variant hop to reach a segment
    async fn locate_segment(&self, url: &str) -> EvaluationResult<String> {
        let body = self.fetch_playlist_bounded(url).await?;

        match find_segment_reference(url, &body) {
            Some(SegmentReference::Segment(segment)) => Ok(segment),
            Some(SegmentReference::Variant(variant)) => {
                trace!("Following variant playlist {}", UrlUtils::obfuscate_credentials(&variant));
                let variant_body = self.fetch_playlist_bounded(&variant).await?;
                match find_segment_reference(&variant, &variant_body) {
                    Some(SegmentReference::Segment(segment)) => Ok(segment),
                    _ => Err(CandidateRejection::sample_failed(
                        "variant playlist has no media segment",
                    )),
                }
            }
            None => Err(CandidateRejection::sample_failed(
                "no media segment reference in response",
            )),
        }
    }

    async fn fetch_playlist_bounded(&self, url: &str) -> EvaluationResult<String> {
        let fetch = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| CandidateRejection::sample_failed(format!("playlist request: {e}")))?;

            if !response.status().is_success() {
                return Err(CandidateRejection::sample_failed(format!(
                    "playlist status {}",
                    response.status()
                )));
            }

            // Live TS endpoints never end; stop at the limit
            let mut body = response.bytes_stream();
            let mut collected: Vec<u8> = Vec::with_capacity(8192);
            while let Some(chunk) = body.next().await {
                let chunk = chunk
                    .map_err(|e| CandidateRejection::sample_failed(format!("playlist body: {e}")))?;
                if collected.len() + chunk.len() > MAX_PLAYLIST_BYTES {
                    collected.extend_from_slice(&chunk[..(MAX_PLAYLIST_BYTES - collected.len())]);
                    break;
                }
                collected.extend_from_slice(&chunk);
            }

            Ok(String::from_utf8_lossy(&collected).to_string())
        };

        tokio::time::timeout(self.manifest_timeout, fetch)
            .await
            .map_err(|_| {
                CandidateRejection::sample_failed(format!(
                    "playlist fetch timed out after {:?}",
                    self.manifest_timeout
                ))
            })?
    }

    /// Download the whole segment and return bytes per second
    async fn measure_throughput(&self, segment_url: &str) -> EvaluationResult<f64> {
        let start = Instant::now();

        let download = async {
            let response = self
                .client
                .get(segment_url)
                .send()
                .await
                .map_err(|e| CandidateRejection::sample_failed(format!("segment request: {e}")))?;

            if !response.status().is_success() {
                return Err(CandidateRejection::sample_failed(format!(
                    "segment status {}",
                    response.status()
                )));
            }

            let mut body = response.bytes_stream();
            let mut bytes_read = 0usize;
            while let Some(chunk) = body.next().await {
                bytes_read += chunk
                    .map_err(|e| CandidateRejection::sample_failed(format!("segment body: {e}")))?
                    .len();
            }
            Ok(bytes_read)
        };

        let bytes_read = tokio::time::timeout(self.segment_timeout, download)
            .await
            .map_err(|_| {
                CandidateRejection::sample_failed(format!(
                    "segment download timed out after {:?}",
                    self.segment_timeout
                ))
            })??;
        let elapsed = start.elapsed();

        let bitrate = compute_bitrate(bytes_read, elapsed, self.min_measurable_elapsed)?;
        debug!(
            "Segment {} bytes in {} ({}): {}",
            bytes_read,
            format_duration_precise(elapsed),
            format_bitrate(bitrate),
            UrlUtils::obfuscate_credentials(segment_url)
        );
        Ok(bitrate)
    }
}

/// Bytes per second, refusing downloads too short to time meaningfully
pub fn compute_bitrate(
    bytes_read: usize,
    elapsed: Duration,
    min_measurable_elapsed: Duration,
) -> EvaluationResult<f64> {
    if bytes_read == 0 {
        return Err(CandidateRejection::sample_failed("segment body was empty"));
    }
    if elapsed.is_zero() || elapsed < min_measurable_elapsed {
        return Err(CandidateRejection::sample_failed(format!(
            "segment elapsed {elapsed:?} too short to measure"
        )));
    }
    Ok(bytes_read as f64 / elapsed.as_secs_f64())
}

/// Find the first media segment (or variant playlist) `body` refers to
///
/// HLS playlists are parsed properly and relative URIs resolved against
/// `playlist_url`. Anything else is scanned for an absolute `.ts` URL.
pub fn find_segment_reference(playlist_url: &str, body: &str) -> Option<SegmentReference> {
    let resolve = |uri: &str| UrlUtils::join(playlist_url, uri.trim()).ok();

    if let Ok(playlist) = m3u8_rs::parse_playlist_res(body.as_bytes()) {
        let found = match playlist {
            Playlist::MediaPlaylist(media) => media
                .segments
                .first()
                .and_then(|segment| resolve(&segment.uri))
                .map(SegmentReference::Segment),
            Playlist::MasterPlaylist(master) => master
                .variants
                .iter()
                .find(|variant| !variant.is_i_frame)
                .and_then(|variant| resolve(&variant.uri))
                .map(SegmentReference::Variant),
        };
        if found.is_some() {
            return found;
        }
    }

    segment_url_regex()
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| SegmentReference::Segment(m.as_str().to_string()))
}

/// A whole URL whose path ends in `.ts`, terminated by a delimiter or EOF
fn segment_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(https?://[^\s"'<>?#]+\.ts(?:\?[^\s"'<>#]*)?)(?:$|[\s"'<>#])"#)
            .expect("static regex")
    })
}

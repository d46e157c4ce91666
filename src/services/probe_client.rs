//! Multi-region liveness probing
//!
//! Each configured region makes one timed attempt against the endpoint.
//! An attempt succeeds once the response is 2xx and a small body prefix has
//! been read; anything else (timeout, connect error, bad status, body error)
//! discards that attempt. Latency is the mean over successful attempts.

use futures::StreamExt;
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{ProbeConfig, ProbeRegion};
use crate::errors::{AppError, AppResult, CandidateRejection, EvaluationResult};
use crate::models::ProbeSample;
use crate::utils::UrlUtils;

#[derive(Debug, Error)]
enum AttemptFailure {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

struct RegionClient {
    name: String,
    client: Client,
}

/// Issues timed reachability attempts from every configured region
pub struct ProbeClient {
    regions: Vec<RegionClient>,
    attempt_timeout: Duration,
    prefix_bytes: usize,
}

impl ProbeClient {
    pub fn new(config: &ProbeConfig) -> AppResult<Self> {
        let regions = config
            .regions
            .iter()
            .map(|region| {
                Ok(RegionClient {
                    name: region.name.clone(),
                    client: build_region_client(region, config.attempt_timeout)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            regions,
            attempt_timeout: config.attempt_timeout,
            prefix_bytes: config.prefix_bytes,
        })
    }

    pub fn attempts_per_probe(&self) -> usize {
        self.regions.len()
    }

    /// Probe `url` once per region; `Unreachable` if no attempt succeeded
    pub async fn probe(&self, url: &str) -> EvaluationResult<ProbeSample> {
        let mut latencies = Vec::with_capacity(self.regions.len());

        for region in &self.regions {
            match self.attempt(&region.client, url).await {
                Ok(elapsed) => {
                    trace!(
                        "Probe attempt from {} succeeded in {:?}: {}",
                        region.name,
                        elapsed,
                        UrlUtils::obfuscate_credentials(url)
                    );
                    latencies.push(elapsed.as_secs_f64());
                }
                Err(e) => {
                    debug!(
                        "Probe attempt from {} failed ({}): {}",
                        region.name,
                        e,
                        UrlUtils::obfuscate_credentials(url)
                    );
                }
            }
        }

        if latencies.is_empty() {
            return Err(CandidateRejection::Unreachable {
                attempts: self.regions.len(),
            });
        }

        Ok(ProbeSample {
            mean_latency_seconds: latencies.iter().sum::<f64>() / latencies.len() as f64,
            successful_attempts: latencies.len(),
        })
    }

    async fn attempt(&self, client: &Client, url: &str) -> Result<Duration, AttemptFailure> {
        let start = Instant::now();

        tokio::time::timeout(self.attempt_timeout, self.read_prefix(client, url))
            .await
            .map_err(|_| AttemptFailure::Timeout(self.attempt_timeout))??;

        Ok(start.elapsed())
    }

    /// Read at most `prefix_bytes`; a shorter body is still a live endpoint
    async fn read_prefix(&self, client: &Client, url: &str) -> Result<usize, AttemptFailure> {
        let response = client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AttemptFailure::Status(response.status().as_u16()));
        }

        let mut body = response.bytes_stream();
        let mut read = 0usize;
        while read < self.prefix_bytes {
            match body.next().await {
                Some(chunk) => read += chunk?.len(),
                None => break,
            }
        }
        Ok(read.min(self.prefix_bytes))
    }
}

fn build_region_client(region: &ProbeRegion, attempt_timeout: Duration) -> AppResult<Client> {
    // No idle pooling: a reused connection would hide connect latency
    let mut builder = Client::builder()
        .connect_timeout(attempt_timeout)
        .pool_max_idle_per_host(0);

    // Environment proxies are ignored; only a region proxy may sit in the path
    builder = match &region.proxy {
        Some(proxy_url) => {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                AppError::configuration(format!(
                    "Invalid proxy for probe region '{}': {e}",
                    region.name
                ))
            })?;
            builder.proxy(proxy)
        }
        None => builder.no_proxy(),
    };

    builder.build().map_err(|e| {
        AppError::configuration(format!(
            "Failed to create HTTP client for probe region '{}': {e}",
            region.name
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_region_proxy() {
        let config = ProbeConfig {
            regions: vec![ProbeRegion {
                name: "eu".to_string(),
                proxy: Some("http://proxy.example.com:notaport".to_string()),
            }],
            ..ProbeConfig::default()
        };
        assert!(matches!(
            ProbeClient::new(&config),
            Err(AppError::Configuration { .. })
        ));
    }

    #[test]
    fn test_one_attempt_per_region() {
        let client = ProbeClient::new(&ProbeConfig::default()).unwrap();
        assert_eq!(client.attempts_per_probe(), 3);
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ProbeConfig {
            attempt_timeout: Duration::from_millis(500),
            ..ProbeConfig::default()
        };
        let client = ProbeClient::new(&config).unwrap();
        let result = client.probe(&format!("http://{addr}/live.m3u8")).await;
        assert_eq!(result, Err(CandidateRejection::Unreachable { attempts: 3 }));
    }
}

//! Candidate ingestion from M3U manifests
//!
//! Sources are HTTP(S) URLs or local file paths. A source that fails to load
//! is logged and skipped; the run only fails when nothing usable remains.

use futures::{stream, StreamExt};
use reqwest::Client;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::SourcesConfig;
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::models::Candidate;
use crate::utils::human_format::format_duration_precise;
use crate::utils::UrlUtils;

pub mod m3u_parser;

pub use m3u_parser::{parse_extinf_title, parse_m3u_content};

/// Sources fetched at the same time
const SOURCE_FETCH_CONCURRENCY: usize = 4;

pub struct M3uIngestor {
    client: Client,
    fetch_timeout: Duration,
}

impl M3uIngestor {
    pub fn new(fetch_timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(fetch_timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            fetch_timeout,
        })
    }

    /// Load every source and return all candidates, in source order
    pub async fn ingest_all(&self, sources: &[String]) -> AppResult<Vec<Candidate>> {
        if sources.is_empty() {
            return Err(SourceError::NoSources.into());
        }

        let start = Instant::now();
        let results: Vec<SourceResult<Vec<Candidate>>> = stream::iter(sources)
            .map(|source| self.ingest(source))
            .buffered(SOURCE_FETCH_CONCURRENCY)
            .collect()
            .await;

        let mut candidates = Vec::new();
        let mut failed = 0usize;
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(mut parsed) => {
                    info!(
                        "Loaded {} candidates from {}",
                        parsed.len(),
                        UrlUtils::obfuscate_credentials(source)
                    );
                    candidates.append(&mut parsed);
                }
                Err(e) => {
                    warn!("Skipping source: {}", e);
                    failed += 1;
                }
            }
        }

        if failed == sources.len() {
            return Err(SourceError::AllSourcesFailed { count: failed }.into());
        }
        if candidates.is_empty() {
            return Err(SourceError::NoCandidates.into());
        }

        info!(
            "Ingested {} candidates from {} of {} sources in {}",
            candidates.len(),
            sources.len() - failed,
            sources.len(),
            format_duration_precise(start.elapsed())
        );
        Ok(candidates)
    }

    pub async fn ingest(&self, source: &str) -> SourceResult<Vec<Candidate>> {
        let content = if UrlUtils::is_stream_url(source) {
            self.fetch_remote(source).await?
        } else {
            self.read_local(source).await?
        };
        Ok(parse_m3u_content(
            &content,
            &UrlUtils::obfuscate_credentials(source),
        ))
    }

    async fn fetch_remote(&self, url: &str) -> SourceResult<String> {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        debug!("Fetching manifest {}", safe_url);

        let fetch = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| SourceError::fetch_failed(&safe_url, e.to_string()))?;

            if !response.status().is_success() {
                return Err(SourceError::Http {
                    status: response.status().as_u16(),
                    url: safe_url.clone(),
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| SourceError::fetch_failed(&safe_url, e.to_string()))?;
            Ok(String::from_utf8_lossy(&bytes).to_string())
        };

        tokio::time::timeout(self.fetch_timeout, fetch)
            .await
            .map_err(|_| SourceError::timeout(&safe_url))?
    }

    async fn read_local(&self, path: &str) -> SourceResult<String> {
        debug!("Reading manifest file {}", path);
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SourceError::fetch_failed(path, e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }
}

/// Read a source list: one source per line, blanks and `#` comments skipped
pub async fn read_source_list(path: &Path) -> AppResult<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::configuration(format!(
            "Failed to read source list {}: {e}",
            path.display()
        ))
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Configured URLs followed by list-file entries, duplicates removed
pub async fn collect_sources(config: &SourcesConfig) -> AppResult<Vec<String>> {
    let mut sources: Vec<String> = Vec::new();
    let listed = match &config.list_file {
        Some(path) => read_source_list(path).await?,
        None => Vec::new(),
    };

    for source in config.urls.iter().chain(listed.iter()) {
        let source = source.trim();
        if !source.is_empty() && !sources.iter().any(|s| s == source) {
            sources.push(source.to_string());
        }
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = "#EXTM3U\n#EXTINF:-1,News24\nhttp://streams.example.com/news24.m3u8\n";

    fn ingestor() -> M3uIngestor {
        M3uIngestor::new(Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_read_source_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sources.txt");
        std::fs::write(
            &path,
            "# primary\nhttp://a.example.com/list.m3u\n\n   \n  http://b.example.com/list.m3u  \n",
        )
        .unwrap();

        let sources = read_source_list(&path).await.unwrap();
        assert_eq!(
            sources,
            vec!["http://a.example.com/list.m3u", "http://b.example.com/list.m3u"]
        );
    }

    #[tokio::test]
    async fn test_missing_source_list_is_configuration_error() {
        let result = read_source_list(Path::new("/nonexistent/sources.txt")).await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_collect_sources_merges_and_dedups() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sources.txt");
        std::fs::write(&path, "http://a.example.com/list.m3u\nhttp://c.example.com/list.m3u\n")
            .unwrap();

        let config = SourcesConfig {
            urls: vec![
                "http://a.example.com/list.m3u".to_string(),
                "http://b.example.com/list.m3u".to_string(),
            ],
            list_file: Some(path),
            ..SourcesConfig::default()
        };
        let sources = collect_sources(&config).await.unwrap();
        assert_eq!(
            sources,
            vec![
                "http://a.example.com/list.m3u",
                "http://b.example.com/list.m3u",
                "http://c.example.com/list.m3u",
            ]
        );
    }

    #[tokio::test]
    async fn test_ingest_local_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.m3u");
        std::fs::write(&path, MANIFEST).unwrap();

        let candidates = ingestor()
            .ingest_all(&[path.to_string_lossy().to_string()])
            .await
            .unwrap();
        assert_eq!(
            candidates,
            vec![Candidate::new("News24", "http://streams.example.com/news24.m3u8")]
        );
    }

    #[tokio::test]
    async fn test_failed_source_is_skipped() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.m3u");
        std::fs::write(&good, MANIFEST).unwrap();

        let candidates = ingestor()
            .ingest_all(&[
                dir.path().join("missing.m3u").to_string_lossy().to_string(),
                good.to_string_lossy().to_string(),
            ])
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_fatal_ingestion_outcomes() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.m3u");
        std::fs::write(&empty, "#EXTM3U\n").unwrap();

        assert!(matches!(
            ingestor().ingest_all(&[]).await,
            Err(AppError::Source(SourceError::NoSources))
        ));
        assert!(matches!(
            ingestor()
                .ingest_all(&["/nonexistent/a.m3u".to_string(), "/nonexistent/b.m3u".to_string()])
                .await,
            Err(AppError::Source(SourceError::AllSourcesFailed { count: 2 }))
        ));
        assert!(matches!(
            ingestor()
                .ingest_all(&[empty.to_string_lossy().to_string()])
                .await,
            Err(AppError::Source(SourceError::NoCandidates))
        ));
    }
}

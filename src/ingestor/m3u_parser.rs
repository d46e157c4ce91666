//! M3U manifest parsing into candidates

use tracing::{debug, warn};

use crate::models::Candidate;
use crate::utils::UrlUtils;

/// Parse an M3U manifest into candidates
///
/// Each `#EXTINF` line is paired with the next non-comment line. A second
/// `#EXTINF` before any locator replaces the first. Entries with an empty
/// title or a locator that is not an http(s) URL are skipped.
pub fn parse_m3u_content(content: &str, source_name: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut pending_title: Option<String> = None;
    let mut skipped = 0usize;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with("#EXTINF") {
            pending_title = Some(parse_extinf_title(line));
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        let Some(title) = pending_title.take() else {
            debug!(
                "Locator without EXTINF at line {} in {}, skipping",
                line_num + 1,
                source_name
            );
            skipped += 1;
            continue;
        };

        if title.is_empty() {
            debug!("Empty title at line {} in {}, skipping", line_num + 1, source_name);
            skipped += 1;
            continue;
        }

        if !UrlUtils::is_stream_url(line) {
            debug!(
                "Unsupported locator for '{}' at line {} in {}, skipping",
                title,
                line_num + 1,
                source_name
            );
            skipped += 1;
            continue;
        }

        candidates.push(Candidate::new(title, line));
    }

    if skipped > 0 {
        warn!("Skipped {} malformed entries in {}", skipped, source_name);
    }

    candidates
}

/// Title of an `#EXTINF` line: everything after the last comma
///
/// `#EXTINF:-1 tvg-id="x" group-title="News",CCTV-1` -> `CCTV-1`. A line
/// without a comma has no title.
pub fn parse_extinf_title(line: &str) -> String {
    let content = line.strip_prefix("#EXTINF:").unwrap_or(line);
    content
        .rfind(',')
        .map(|pos| content[pos + 1..].trim().to_string())
        .unwrap_or_default()
}

//! M3U rendering of the curated playlist

use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::models::CuratedPlaylist;
use crate::utils::human_format::format_duration_precise;

pub struct PlaylistEmitter {
    category_order: Vec<String>,
}

impl PlaylistEmitter {
    /// `category_order` is the declared block order; unknown categories
    /// present in a playlist are appended alphabetically
    pub fn new(category_order: Vec<String>) -> Self {
        Self { category_order }
    }

    /// Categories of `playlist` in emission order, empty ones skipped
    pub fn ordered_categories(&self, playlist: &CuratedPlaylist) -> Vec<String> {
        let mut ordered: Vec<String> = self
            .category_order
            .iter()
            .filter(|category| !playlist.channels(category).is_empty())
            .cloned()
            .collect();

        let mut extra: Vec<String> = playlist
            .categories()
            .filter(|category| {
                !self.category_order.iter().any(|known| known == category)
                    && !playlist.channels(category).is_empty()
            })
            .map(str::to_string)
            .collect();
        extra.sort();
        ordered.extend(extra);
        ordered
    }

    pub fn render(&self, playlist: &CuratedPlaylist, generated_at: DateTime<Utc>) -> String {
        let mut out = String::with_capacity(64 + playlist.channel_count() * 256);
        out.push_str("#EXTM3U\n");
        let _ = writeln!(
            out,
            "# Updated: {} UTC\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        );

        for category in self.ordered_categories(playlist) {
            let _ = writeln!(out, "# ===== {category} =====");
            for channel in playlist.channels(&category) {
                let _ = writeln!(
                    out,
                    "#EXTINF:-1 tvg-logo=\"{}\" group-title=\"{}\",{} ({})",
                    channel.logo_url, category, channel.name, channel.score
                );
                let _ = writeln!(out, "{}", channel.url);
            }
            out.push('\n');
        }

        out
    }

    /// Render and write to `path`, replacing any previous file
    ///
    /// The content goes to a sibling temp file first and is renamed into
    /// place, so a failed write never truncates the previous playlist.
    pub async fn write_to(
        &self,
        playlist: &CuratedPlaylist,
        path: &Path,
        generated_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let start = Instant::now();
        let path_display = path.display().to_string();
        let output_err = |e: std::io::Error| AppError::output(path_display.clone(), e.to_string());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(output_err)?;
        }

        let content = self.render(playlist, generated_at);
        let temp_path = path.with_extension("m3u.tmp");

        let file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(output_err)?;
        let mut writer = tokio::io::BufWriter::new(file);
        writer
            .write_all(content.as_bytes())
            .await
            .map_err(output_err)?;
        writer.flush().await.map_err(output_err)?;
        drop(writer);

        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(output_err(e));
        }
        debug!("Renamed {} into place", temp_path.display());

        let bytes_written = content.len() as u64;
        info!(
            "Playlist written: path={} channels={} bytes={} duration={}",
            path_display,
            playlist.channel_count(),
            bytes_written,
            format_duration_precise(start.elapsed())
        );
        Ok(bytes_written)
    }
}

//! Stream Probing Service
//!
//! Resolution is read by running ffprobe against the endpoint. The process
//! runs with its own timeout, a null stdin and piped output, and is killed if
//! the probe future is dropped (timeout or run cancellation).

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::errors::WidthProbeError;
use crate::utils::UrlUtils;

/// First video stream's width as bare CSV
#[rustfmt::skip]
const WIDTH_ARGS: [&str; 8] = [
    "-v", "error",
    "-select_streams", "v:0",
    "-show_entries", "stream=width",
    "-of", "csv=p=0",
];

/// Reads the pixel width of a stream's first video track
#[async_trait]
pub trait WidthProbe: Send + Sync {
    async fn probe_width(&self, url: &str) -> Result<u32, WidthProbeError>;
}

/// `WidthProbe` backed by an ffprobe executable
pub struct FfprobeWidthProbe {
    ffprobe_command: String,
    probe_timeout: Duration,
}

impl FfprobeWidthProbe {
    pub fn new(ffprobe_command: Option<String>, probe_timeout: Duration) -> Self {
        Self {
            ffprobe_command: ffprobe_command.unwrap_or_else(|| "ffprobe".to_string()),
            probe_timeout,
        }
    }
}

#[async_trait]
impl WidthProbe for FfprobeWidthProbe {
    async fn probe_width(&self, url: &str) -> Result<u32, WidthProbeError> {
        debug!("Probing width: {}", UrlUtils::obfuscate_credentials(url));

        let mut cmd = Command::new(&self.ffprobe_command);
        cmd.args(WIDTH_ARGS).arg(url);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let output = tokio::time::timeout(self.probe_timeout, cmd.output())
            .await
            .map_err(|_| WidthProbeError::Timeout {
                timeout_ms: self.probe_timeout.as_millis() as u64,
            })?
            .map_err(|e| WidthProbeError::Spawn {
                command: self.ffprobe_command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WidthProbeError::ExitStatus {
                code: output.status.code(),
                stderr: UrlUtils::obfuscate_credentials(stderr.trim()),
            });
        }

        parse_width(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse `csv=p=0` output: one width per line, first video stream first
pub fn parse_width(stdout: &str) -> Result<u32, WidthProbeError> {
    let invalid = || WidthProbeError::InvalidOutput {
        output: stdout.trim().to_string(),
    };

    let first = stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(invalid)?;

    match first.trim_end_matches(',').parse::<u32>() {
        Ok(width) if width > 0 => Ok(width),
        _ => Err(invalid()),
    }
}

//! Quality scoring rubric
//!
//! | signal    | top band       | middle band    | else |
//! |-----------|----------------|----------------|------|
//! | latency   | < 1.0s  -> 30  | < 1.5s  -> 20  | 0    |
//! | width     | >= 1920 -> 30  | >= 1280 -> 20  | 0    |
//! | bitrate   | > 4 MB/s -> 20 | > 2 MB/s -> 10 | 0    |
//!
//! Bitrate is in bytes per second.

/// Highest score the rubric can award
pub const MAX_SCORE: u32 = 80;

const FAST_LATENCY_SECS: f64 = 1.0;
const OK_LATENCY_SECS: f64 = 1.5;
const FULL_HD_WIDTH: u32 = 1920;
const HD_WIDTH: u32 = 1280;
const HIGH_BITRATE: f64 = 4_000_000.0;
const MEDIUM_BITRATE: f64 = 2_000_000.0;

/// Score a measured stream; pure and deterministic
pub fn score(latency_seconds: f64, width_pixels: u32, bitrate_bytes_per_second: f64) -> u32 {
    latency_points(latency_seconds)
        + resolution_points(width_pixels)
        + bitrate_points(bitrate_bytes_per_second)
}

fn latency_points(latency_seconds: f64) -> u32 {
    if latency_seconds < FAST_LATENCY_SECS {
        30
    } else if latency_seconds < OK_LATENCY_SECS {
        20
    } else {
        0
    }
}

fn resolution_points(width_pixels: u32) -> u32 {
    if width_pixels >= FULL_HD_WIDTH {
        30
    } else if width_pixels >= HD_WIDTH {
        20
    } else {
        0
    }
}

fn bitrate_points(bitrate_bytes_per_second: f64) -> u32 {
    if bitrate_bytes_per_second > HIGH_BITRATE {
        20
    } else if bitrate_bytes_per_second > MEDIUM_BITRATE {
        10
    } else {
        0
    }
}

/// Inclusive acceptance gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreGate {
    threshold: u32,
}

impl ScoreGate {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn accepts(&self, score: u32) -> bool {
        score >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scores() {
        assert_eq!(score(0.5, 1920, 4_500_000.0), 80);
        // 20 (latency) + 20 (width) + 10 (bitrate)
        assert_eq!(score(1.2, 1280, 2_500_000.0), 50);
        assert_eq!(score(3.0, 640, 1_000_000.0), 0);
    }

    #[test]
    fn test_middle_bands() {
        assert_eq!(score(2.0, 1280, 2_500_000.0), 30);
        assert_eq!(score(1.2, 1280, 1_000_000.0), 40);
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(latency_points(0.999), 30);
        assert_eq!(latency_points(1.0), 20);
        assert_eq!(latency_points(1.5), 0);
        assert_eq!(resolution_points(1919), 20);
        assert_eq!(resolution_points(1920), 30);
        assert_eq!(resolution_points(1279), 0);
        assert_eq!(bitrate_points(4_000_000.0), 10);
        assert_eq!(bitrate_points(4_000_000.5), 20);
        assert_eq!(bitrate_points(2_000_000.0), 0);
    }

    #[test]
    fn test_monotonic_in_each_signal() {
        let latencies = [3.0, 1.4, 1.2, 0.9, 0.1];
        let widths = [320, 1280, 1600, 1920, 3840];
        let bitrates = [500_000.0, 2_100_000.0, 3_000_000.0, 4_100_000.0, 9_000_000.0];

        for &w in &widths {
            for &b in &bitrates {
                let scores: Vec<_> = latencies.iter().map(|&l| score(l, w, b)).collect();
                assert!(scores.windows(2).all(|p| p[0] <= p[1]), "latency {scores:?}");
            }
        }
        for &l in &latencies {
            for &b in &bitrates {
                let scores: Vec<_> = widths.iter().map(|&w| score(l, w, b)).collect();
                assert!(scores.windows(2).all(|p| p[0] <= p[1]), "width {scores:?}");
            }
        }
        for &l in &latencies {
            for &w in &widths {
                let scores: Vec<_> = bitrates.iter().map(|&b| score(l, w, b)).collect();
                assert!(scores.windows(2).all(|p| p[0] <= p[1]), "bitrate {scores:?}");
            }
        }
    }

    #[test]
    fn test_score_never_exceeds_max() {
        assert_eq!(score(0.0, u32::MAX, f64::MAX), MAX_SCORE);
    }

    #[test]
    fn test_gate_is_inclusive() {
        let gate = ScoreGate::new(80);
        assert!(gate.accepts(80));
        assert!(!gate.accepts(79));

        let relaxed = ScoreGate::new(50);
        assert!(relaxed.accepts(50));
        assert!(!relaxed.accepts(40));
    }

    #[test]
    fn test_idempotent() {
        assert_eq!(score(0.8, 1920, 5_000_000.0), score(0.8, 1920, 5_000_000.0));
    }
}

//! Single-candidate evaluation: probe, sample, score, classify

use std::sync::Arc;
use tracing::trace;

use crate::config::Config;
use crate::errors::{AppResult, CandidateRejection, EvaluationResult};
use crate::models::{Candidate, EvaluatedChannel};
use crate::services::{
    score, ChannelClassifier, ProbeClient, QualitySampler, ScoreGate, WidthProbe,
};
use crate::utils::LogoUrlGenerator;

/// Everything needed to judge one (already noise-filtered) candidate
///
/// Holds no per-candidate state; one instance is shared by all tasks.
pub struct CandidateEvaluator {
    probe_client: ProbeClient,
    sampler: QualitySampler,
    gate: ScoreGate,
    classifier: ChannelClassifier,
    logos: LogoUrlGenerator,
}

impl CandidateEvaluator {
    pub fn new(
        probe_client: ProbeClient,
        sampler: QualitySampler,
        gate: ScoreGate,
        classifier: ChannelClassifier,
        logos: LogoUrlGenerator,
    ) -> Self {
        Self {
            probe_client,
            sampler,
            gate,
            classifier,
            logos,
        }
    }

    pub fn from_config(config: &Config, width_probe: Arc<dyn WidthProbe>) -> AppResult<Self> {
        Ok(Self::new(
            ProbeClient::new(&config.probe)?,
            QualitySampler::new(&config.sampler, width_probe)?,
            ScoreGate::new(config.scoring.threshold),
            ChannelClassifier::from_config(&config.classification),
            LogoUrlGenerator::new(config.output.logo_url_template.clone()),
        ))
    }

    pub fn classifier(&self) -> &ChannelClassifier {
        &self.classifier
    }

    pub async fn evaluate(&self, candidate: &Candidate) -> EvaluationResult<EvaluatedChannel> {
        let probe = self.probe_client.probe(&candidate.endpoint_url).await?;
        let signal = self.sampler.sample(&candidate.endpoint_url).await?;

        let channel_score = score(
            probe.mean_latency_seconds,
            signal.width_pixels,
            signal.bitrate_bytes_per_second,
        );
        trace!(
            "{}: latency={:.3}s width={} bitrate={:.0}B/s score={}",
            candidate.display_name,
            probe.mean_latency_seconds,
            signal.width_pixels,
            signal.bitrate_bytes_per_second,
            channel_score
        );

        if !self.gate.accepts(channel_score) {
            return Err(CandidateRejection::BelowThreshold {
                score: channel_score,
                threshold: self.gate.threshold(),
            });
        }

        Ok(EvaluatedChannel {
            name: candidate.display_name.clone(),
            url: candidate.endpoint_url.clone(),
            category: self.classifier.classify(&candidate.display_name).to_string(),
            score: channel_score,
            logo_url: self.logos.generate(&candidate.display_name),
        })
    }
}

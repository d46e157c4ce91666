//! Bounded-concurrency evaluation of a candidate batch
//!
//! Noise is rejected up front without taking a slot. Every other candidate
//! waits for a semaphore permit before its task is spawned, so the number of
//! spawned tasks never exceeds `max_concurrency`. Cancelling the run token
//! abandons in-flight candidates and stops new ones from starting; all of
//! them are reported as `Cancelled`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::errors::{AppError, AppResult, CandidateRejection, EvaluationResult};
use crate::models::{Candidate, EvaluatedChannel};
use crate::pipeline::evaluator::CandidateEvaluator;
use crate::services::{NoiseFilter, WidthProbe};
use crate::utils::human_format::format_duration_precise;

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub candidates: usize,
    pub accepted: usize,
    /// Rejections keyed by `CandidateRejection::kind()`
    pub rejections: BTreeMap<&'static str, usize>,
    /// Tasks that panicked instead of producing an outcome
    pub aborted_tasks: usize,
    pub elapsed: Duration,
}

impl RunStats {
    pub fn rejected(&self, kind: &str) -> usize {
        self.rejections.get(kind).copied().unwrap_or(0)
    }

    pub fn total_rejected(&self) -> usize {
        self.rejections.values().sum()
    }

    /// Candidates with a known fate; equals `candidates` after a run
    pub fn resolved(&self) -> usize {
        self.accepted + self.total_rejected() + self.aborted_tasks
    }

    fn record(&mut self, outcome: &EvaluationResult<EvaluatedChannel>) {
        match outcome {
            Ok(_) => self.accepted += 1,
            Err(rejection) => *self.rejections.entry(rejection.kind()).or_insert(0) += 1,
        }
    }
}

/// Accepted channels in candidate input order, plus run counters
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub channels: Vec<EvaluatedChannel>,
    pub stats: RunStats,
}

pub struct HealthCheckCoordinator {
    noise_filter: NoiseFilter,
    evaluator: Arc<CandidateEvaluator>,
    max_concurrency: usize,
}

impl HealthCheckCoordinator {
    pub fn new(
        noise_filter: NoiseFilter,
        evaluator: CandidateEvaluator,
        max_concurrency: usize,
    ) -> AppResult<Self> {
        if max_concurrency == 0 {
            return Err(AppError::configuration(
                "max_concurrency must be greater than 0",
            ));
        }
        Ok(Self {
            noise_filter,
            evaluator: Arc::new(evaluator),
            max_concurrency,
        })
    }

    pub fn from_config(config: &Config, width_probe: Arc<dyn WidthProbe>) -> AppResult<Self> {
        Self::new(
            NoiseFilter::new(config.classification.noise_keywords.iter().cloned()),
            CandidateEvaluator::from_config(config, width_probe)?,
            config.curation.max_concurrency,
        )
    }

    pub fn evaluator(&self) -> &CandidateEvaluator {
        &self.evaluator
    }

    /// Evaluate every candidate and wait for all of them to resolve
    pub async fn run(&self, candidates: Vec<Candidate>, cancel: CancellationToken) -> RunReport {
        let started = Instant::now();
        let total = candidates.len();
        info!(
            "Evaluating {} candidates (max concurrency {})",
            total, self.max_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks: JoinSet<(usize, String, EvaluationResult<EvaluatedChannel>)> =
            JoinSet::new();
        let mut outcomes: Vec<(usize, String, EvaluationResult<EvaluatedChannel>)> =
            Vec::with_capacity(total);
        // Spawned but not yet joined, so a panicked task can still be named
        let mut pending: HashMap<usize, String> = HashMap::new();

        for (index, candidate) in candidates.into_iter().enumerate() {
            if let Some(keyword) = self.noise_filter.matched_keyword(&candidate.display_name) {
                let rejection = CandidateRejection::Noise {
                    keyword: keyword.to_string(),
                };
                outcomes.push((index, candidate.display_name, Err(rejection)));
                continue;
            }

            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                outcomes.push((index, candidate.display_name, Err(CandidateRejection::Cancelled)));
                continue;
            };

            pending.insert(index, candidate.display_name.clone());
            let evaluator = Arc::clone(&self.evaluator);
            let token = cancel.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let outcome = tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(CandidateRejection::Cancelled),
                    outcome = evaluator.evaluate(&candidate) => outcome,
                };
                (index, candidate.display_name, outcome)
            });
        }

        let mut aborted_tasks = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    pending.remove(&outcome.0);
                    outcomes.push(outcome);
                }
                Err(e) => {
                    debug!("Candidate task failed: {}", e);
                    aborted_tasks += 1;
                }
            }
        }

        let mut lost: Vec<(usize, String)> = pending.into_iter().collect();
        lost.sort_by_key(|(index, _)| *index);
        for (index, name) in lost {
            error!("Candidate #{} '{}' produced no outcome: task aborted", index, name);
        }

        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut stats = RunStats {
            candidates: total,
            aborted_tasks,
            ..RunStats::default()
        };
        let mut channels = Vec::new();
        for (_, name, outcome) in outcomes {
            stats.record(&outcome);
            match outcome {
                Ok(channel) => {
                    debug!(
                        "Accepted '{}' into {} with score {}",
                        channel.name, channel.category, channel.score
                    );
                    channels.push(channel);
                }
                Err(rejection) => {
                    debug!("Rejected '{}' [{}]: {}", name, rejection.kind(), rejection);
                }
            }
        }
        stats.elapsed = started.elapsed();

        info!(
            "Evaluated {} candidates in {}: {} accepted, {} rejected, {} aborted{}",
            stats.candidates,
            format_duration_precise(stats.elapsed),
            stats.accepted,
            stats.total_rejected(),
            stats.aborted_tasks,
            if cancel.is_cancelled() { " (run cancelled)" } else { "" }
        );

        RunReport { channels, stats }
    }
}

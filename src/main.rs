use anyhow::{bail, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stream_curator::{
    config::Config,
    ingestor::{collect_sources, M3uIngestor},
    pipeline::HealthCheckCoordinator,
    playlist::PlaylistEmitter,
    services::{Curator, FfprobeWidthProbe},
};

#[derive(Parser)]
#[command(name = "stream-curator")]
#[command(version)]
#[command(about = "Health-check IPTV playlists and emit a curated M3U")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Output playlist path (overrides config file)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Source manifest URL or path; repeatable, replaces configured URLs
    #[arg(short, long = "source", value_name = "URL")]
    sources: Vec<String>,

    /// File listing one source per line (overrides config file)
    #[arg(long, value_name = "PATH")]
    sources_file: Option<PathBuf>,

    /// Candidates evaluated at the same time
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("stream_curator={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Stream Curator v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(output) = cli.output {
        config.output.path = output;
    }
    if !cli.sources.is_empty() {
        config.sources.urls = cli.sources;
    }
    if let Some(sources_file) = cli.sources_file {
        config.sources.list_file = Some(sources_file);
    }
    if let Some(concurrency) = cli.concurrency {
        config.curation.max_concurrency = concurrency;
    }
    config.validate()?;

    let sources = collect_sources(&config.sources).await?;
    let candidates = M3uIngestor::new(config.sources.fetch_timeout)?
        .ingest_all(&sources)
        .await?;

    let width_probe = Arc::new(FfprobeWidthProbe::new(
        Some(config.sampler.ffprobe_command.clone()),
        config.sampler.ffprobe_timeout,
    ));
    let coordinator = HealthCheckCoordinator::from_config(&config, width_probe)?;

    let cancel = CancellationToken::new();
    let ctrl_c_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, abandoning in-flight candidates");
                cancel.cancel();
            }
        })
    };
    let run_timeout_task = config.curation.run_timeout.map(|run_timeout| {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(run_timeout).await;
            warn!("Run timeout of {:?} reached, abandoning in-flight candidates", run_timeout);
            cancel.cancel();
        })
    });

    let report = coordinator.run(candidates, cancel.clone()).await;

    ctrl_c_task.abort();
    if let Some(task) = run_timeout_task {
        task.abort();
    }

    for (kind, count) in &report.stats.rejections {
        info!("Rejected [{}]: {}", kind, count);
    }
    if report.stats.aborted_tasks > 0 {
        warn!("{} candidate tasks aborted", report.stats.aborted_tasks);
    }

    let curated = Curator::new(config.curation.max_per_category).curate(report.channels);
    if curated.is_empty() {
        bail!(
            "No channels met the score threshold of {} ({} candidates evaluated); {} left untouched",
            config.scoring.threshold,
            report.stats.candidates,
            config.output.path.display()
        );
    }

    let emitter = PlaylistEmitter::new(coordinator.evaluator().classifier().category_order());
    emitter
        .write_to(&curated, &config.output.path, Utc::now())
        .await?;

    info!(
        "Curated {} channels across {} categories from {} candidates in {}",
        curated.channel_count(),
        emitter.ordered_categories(&curated).len(),
        report.stats.candidates,
        stream_curator::utils::human_format::format_duration_precise(report.stats.elapsed)
    );

    if cancel.is_cancelled() {
        warn!("Run was cancelled; playlist reflects only completed candidates");
    }

    Ok(())
}

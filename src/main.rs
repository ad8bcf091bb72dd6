//! Tech Radar Updater: binary entrypoint.
//! Loads config, probes optional capabilities, and runs one update pass.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tech_radar_updater::capabilities::process_capabilities;
use tech_radar_updater::config::load_config_or_default;
use tech_radar_updater::gate::GateDecision;
use tech_radar_updater::ingest::providers::default_sources;
use tech_radar_updater::metrics::Metrics;
use tech_radar_updater::pipeline::{Pipeline, RunOptions, RunOutcome};
use tech_radar_updater::publish::{publish_now_next, ReadmePublisher};
use tech_radar_updater::snapshot::JsonSnapshotStore;

#[derive(Parser, Debug)]
#[command(name = "tech-radar", version, about = "Refresh the README tech radar from GitHub and Stack Overflow trends")]
struct Cli {
    /// Config file (TOML or JSON)
    #[arg(long, global = true, env = "RADAR_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Gate, score, publish and persist
    Run {
        /// Skip the update gate
        #[arg(long)]
        force: bool,
        /// Print the rendered radar and write nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Evaluate the update gate only
    Check,
    /// Render data/now.json into the README Now/Next section
    NowNext,
    /// List the optional capabilities that could be acquired
    Probe,
}

/// `RADAR_LOG_FORMAT=json` switches to JSON lines; compact otherwise.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("tech_radar_updater=info,tech_radar=info,warn")
    });
    let json = std::env::var("RADAR_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (GITHUB_TOKEN, OPENAI_API_KEY, RADAR_CONFIG_PATH).
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = load_config_or_default(cli.config.as_deref());

    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            warn!(error = %e, "metrics disabled");
            None
        }
    };

    match cli.command {
        Command::NowNext => {
            let changed = publish_now_next(&cfg.paths.readme, &cfg.paths.now_next, &cfg.publish)
                .await
                .context("now/next publish")?;
            println!("{}", if changed { "now/next updated" } else { "now/next unchanged" });
            return Ok(());
        }
        Command::Probe => {
            let caps = process_capabilities(&cfg.capabilities).await;
            for c in caps.available() {
                println!("{}", c.as_str());
            }
            return Ok(());
        }
        Command::Check | Command::Run { .. } => {}
    }

    let caps = process_capabilities(&cfg.capabilities).await.clone();
    let sources = default_sources(&cfg.sources).context("building http sources")?;
    let store = JsonSnapshotStore::new(cfg.paths.snapshot.clone());
    let publisher = ReadmePublisher::new(cfg.paths.readme.clone(), cfg.publish.clone());
    let textfile = cfg.paths.metrics_textfile.clone();
    let pipeline = Pipeline::new(cfg, caps, sources, Box::new(store), Box::new(publisher));

    let now = Utc::now();
    match cli.command {
        Command::Check => match pipeline.check(now).await {
            GateDecision::Update { reason, .. } => {
                println!("update: {}", serde_json::to_string(&reason)?);
            }
            GateDecision::Skip { reason } => {
                println!("skip: {}", serde_json::to_string(&reason)?);
            }
        },
        Command::Run { force, dry_run } => {
            let outcome = pipeline
                .run(RunOptions { force, dry_run }, now)
                .await
                .context("radar update run")?;
            match outcome {
                RunOutcome::Skipped(reason) => {
                    info!(reason = ?reason, "no update needed");
                }
                RunOutcome::Updated(report) => {
                    if dry_run {
                        println!("{}", report.rendered);
                    }
                    info!(
                        total_trends = report.snapshot.total_trends,
                        published = report.published,
                        "tech radar updated"
                    );
                }
            }
        }
        Command::NowNext | Command::Probe => {}
    }

    if let (Some(m), Some(path)) = (metrics.as_ref(), textfile.as_deref()) {
        if let Err(e) = m.write_textfile(path).await {
            warn!(error = %e, path = %path.display(), "metrics textfile not written");
        }
    }
    Ok(())
}

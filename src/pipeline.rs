//! End-to-end run: gate -> fetch -> score -> aggregate -> publish -> persist.

use chrono::{DateTime, Utc};
use metrics::histogram;
use std::time::Instant;
use tracing::{info, warn};

use crate::capabilities::{Capabilities, Capability};
use crate::config::RadarConfig;
use crate::error::Result;
use crate::gate::{GateDecision, SkipReason, UpdateGate, UpdateReason};
use crate::ingest::{fetch_all, types::TrendSource};
use crate::publish::{render_radar, Publisher};
use crate::radar::{build_radar, Radar};
use crate::scoring::Scorer;
use crate::snapshot::{RadarSnapshot, SnapshotStore};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Bypass the update gate.
    pub force: bool,
    /// Score and render, but write nothing.
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct UpdateReport {
    pub reason: UpdateReason,
    pub radar: Radar,
    pub rendered: String,
    pub snapshot: RadarSnapshot,
    pub published: bool,
    pub persisted: bool,
}

#[derive(Debug)]
pub enum RunOutcome {
    Skipped(SkipReason),
    Updated(Box<UpdateReport>),
}

pub struct Pipeline {
    cfg: RadarConfig,
    caps: Capabilities,
    sources: Vec<Box<dyn TrendSource>>,
    store: Box<dyn SnapshotStore>,
    publisher: Box<dyn Publisher>,
}

impl Pipeline {
    pub fn new(
        cfg: RadarConfig,
        caps: Capabilities,
        sources: Vec<Box<dyn TrendSource>>,
        store: Box<dyn SnapshotStore>,
        publisher: Box<dyn Publisher>,
    ) -> Self {
        Self {
            cfg,
            caps,
            sources,
            store,
            publisher,
        }
    }

    pub fn gate(&self) -> UpdateGate {
        UpdateGate::from_config(&self.cfg)
    }

    /// Evaluate the gate only.
    pub async fn check(&self, now: DateTime<Utc>) -> GateDecision {
        self.gate()
            .evaluate(self.store.as_ref(), &self.sources, now)
            .await
    }

    pub async fn run(&self, opts: RunOptions, now: DateTime<Utc>) -> Result<RunOutcome> {
        let started = Instant::now();

        let (reason, fetched) = if opts.force {
            info!(target: "gate", "forced run, gate bypassed");
            (UpdateReason::Forced, None)
        } else {
            match self.check(now).await {
                GateDecision::Update { reason, fetched } => (reason, fetched),
                GateDecision::Skip { reason } => return Ok(RunOutcome::Skipped(reason)),
            }
        };

        let records = match fetched {
            Some(r) => {
                info!(target: "ingest", count = r.len(), "reusing records fetched by the gate");
                r
            }
            None => fetch_all(&self.sources).await,
        };
        if records.is_empty() {
            warn!(target: "ingest", "no records fetched, radar will show the baseline only");
        }

        let scorer = Scorer::prepare(self.caps.clone(), self.cfg.interest_phrases()).await;
        let enriched = scorer.enrich_all(records).await;
        let used: Vec<Capability> = scorer.capabilities_used();

        let radar = build_radar(&enriched, &self.cfg.baseline);
        let rendered = render_radar(&radar, &self.cfg.publish);
        let snapshot = RadarSnapshot::new(enriched, used, now);

        let mut published = false;
        let mut persisted = false;
        if opts.dry_run {
            info!(target: "publish", "dry run, nothing written");
        } else {
            match self.publisher.publish(&radar).await {
                Ok(changed) => published = changed,
                Err(e) => warn!(target: "publish", error = %e, "publish failed, snapshot still persisted"),
            }
            self.store.replace(&snapshot).await?;
            persisted = true;
        }

        histogram!("radar_run_seconds").record(started.elapsed().as_secs_f64());
        info!(
            target: "publish",
            total_trends = snapshot.total_trends,
            ai_enhanced = snapshot.ai_enhanced,
            published,
            persisted,
            "run complete"
        );

        Ok(RunOutcome::Updated(Box::new(UpdateReport {
            reason,
            radar,
            rendered,
            snapshot,
            published,
            persisted,
        })))
    }
}

//! # Update Gate
//! Decides whether a run should publish.
//!
//! - no prior snapshot            -> update
//! - prior unreadable             -> update (fail open)
//! - cooldown not elapsed         -> skip
//! - cooldown elapsed             -> refetch names, diff against prior,
//!   update when `total >= min_changes` or `percentage >= threshold`.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use metrics::counter;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::config::schema::DEFAULT_UPDATE_FREQUENCY_DAYS;
use crate::config::RadarConfig;
use crate::ingest::{fetch_all, types::TrendRecord, types::TrendSource};
use crate::snapshot::SnapshotStore;

/// Name-level diff between the prior snapshot and a fresh fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeSet {
    pub additions: Vec<String>,
    pub removals: Vec<String>,
    pub total_changes: usize,
    pub change_percentage: f64,
}

impl ChangeSet {
    pub fn compute(prior: &HashSet<String>, current: &HashSet<String>) -> Self {
        let mut additions: Vec<String> = current.difference(prior).cloned().collect();
        let mut removals: Vec<String> = prior.difference(current).cloned().collect();
        additions.sort();
        removals.sort();
        let total_changes = additions.len() + removals.len();
        let change_percentage = total_changes as f64 / prior.len().max(1) as f64 * 100.0;
        Self {
            additions,
            removals,
            total_changes,
            change_percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UpdateReason {
    NoPriorState,
    PriorStateUnreadable { error: String },
    ChangesDetected(ChangeSet),
    Forced,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    CooldownActive { days_since_update: i64, cadence_days: i64 },
    InsufficientChanges(ChangeSet),
}

#[derive(Debug, Clone)]
pub enum GateDecision {
    /// `fetched` carries the refetched records when the gate already went upstream,
    /// so the pipeline can reuse them.
    Update {
        reason: UpdateReason,
        fetched: Option<Vec<TrendRecord>>,
    },
    Skip {
        reason: SkipReason,
    },
}

impl GateDecision {
    pub fn should_update(&self) -> bool {
        matches!(self, GateDecision::Update { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UpdateGate {
    cadence: ChronoDuration,
    cadence_days: i64,
    min_changes: usize,
    threshold_pct: f64,
}

impl UpdateGate {
    /// Negative or unrepresentable cadences fall back to the default cadence.
    pub fn new(cadence_days: i64, min_changes: usize, threshold_pct: f64) -> Self {
        let (cadence_days, cadence) = match ChronoDuration::try_days(cadence_days) {
            Some(d) if cadence_days >= 0 => (cadence_days, d),
            _ => {
                warn!(target: "gate", cadence_days, "cadence out of range, using default");
                (
                    DEFAULT_UPDATE_FREQUENCY_DAYS,
                    ChronoDuration::days(DEFAULT_UPDATE_FREQUENCY_DAYS),
                )
            }
        };
        Self {
            cadence,
            cadence_days,
            min_changes,
            threshold_pct,
        }
    }

    pub fn from_config(cfg: &RadarConfig) -> Self {
        Self::new(
            cfg.update_frequency_days,
            cfg.min_changes_for_update,
            cfg.change_threshold_percentage,
        )
    }

    /// `true` once at least one full cadence has passed since `last`.
    pub fn cooldown_elapsed(&self, last: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(last) >= self.cadence
    }

    pub fn threshold_met(&self, changes: &ChangeSet) -> bool {
        changes.total_changes >= self.min_changes || changes.change_percentage >= self.threshold_pct
    }

    pub async fn evaluate(
        &self,
        store: &dyn SnapshotStore,
        sources: &[Box<dyn TrendSource>],
        now: DateTime<Utc>,
    ) -> GateDecision {
        let decision = self.evaluate_inner(store, sources, now).await;
        let label = if decision.should_update() { "update" } else { "skip" };
        counter!("gate_decisions_total", "decision" => label).increment(1);
        decision
    }

    async fn evaluate_inner(
        &self,
        store: &dyn SnapshotStore,
        sources: &[Box<dyn TrendSource>],
        now: DateTime<Utc>,
    ) -> GateDecision {
        if !store.exists().await {
            info!(target: "gate", "no previous snapshot, initial update needed");
            return GateDecision::Update {
                reason: UpdateReason::NoPriorState,
                fetched: None,
            };
        }

        let prior = match store.load_prior().await {
            Ok(p) => p,
            Err(e) => {
                warn!(target: "gate", error = %e, "prior snapshot unreadable, updating");
                return GateDecision::Update {
                    reason: UpdateReason::PriorStateUnreadable {
                        error: e.to_string(),
                    },
                    fetched: None,
                };
            }
        };

        if !self.cooldown_elapsed(prior.last_updated, now) {
            let days = now.signed_duration_since(prior.last_updated).num_days();
            info!(target: "gate", days_since_update = days, cadence_days = self.cadence_days, "cooldown active, skipping");
            return GateDecision::Skip {
                reason: SkipReason::CooldownActive {
                    days_since_update: days,
                    cadence_days: self.cadence_days,
                },
            };
        }

        let fetched = fetch_all(sources).await;
        let current: HashSet<String> = fetched.iter().map(|r| r.name.clone()).collect();
        let changes = ChangeSet::compute(&prior.names, &current);

        info!(
            target: "gate",
            additions = changes.additions.len(),
            removals = changes.removals.len(),
            total = changes.total_changes,
            percentage = changes.change_percentage,
            min_changes = self.min_changes,
            threshold = self.threshold_pct,
            "change analysis"
        );

        if self.threshold_met(&changes) {
            info!(target: "gate", "changes detected, update needed");
            GateDecision::Update {
                reason: UpdateReason::ChangesDetected(changes),
                fetched: Some(fetched),
            }
        } else {
            info!(target: "gate", "insufficient changes, skipping");
            GateDecision::Skip {
                reason: SkipReason::InsufficientChanges(changes),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn change_set_counts_both_directions() {
        let c = ChangeSet::compute(&set(&["A", "B", "C"]), &set(&["A", "B", "D"]));
        assert_eq!(c.additions, vec!["D".to_string()]);
        assert_eq!(c.removals, vec!["C".to_string()]);
        assert_eq!(c.total_changes, 2);
        assert!((c.change_percentage - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_prior_uses_denominator_one() {
        let c = ChangeSet::compute(&set(&[]), &set(&["x", "y"]));
        assert_eq!(c.total_changes, 2);
        assert!((c.change_percentage - 200.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_is_either_or() {
        let gate = UpdateGate::new(1, 3, 5.0);
        let c = ChangeSet::compute(&set(&["A", "B", "C"]), &set(&["A", "B", "D"]));
        assert!(gate.threshold_met(&c)); // 66.7% >= 5%

        let strict = UpdateGate::new(1, 3, 90.0);
        assert!(!strict.threshold_met(&c));

        let by_count = UpdateGate::new(1, 2, 90.0);
        assert!(by_count.threshold_met(&c));
    }

    #[test]
    fn cooldown_in_whole_cadence() {
        let gate = UpdateGate::new(1, 3, 5.0);
        let t0 = Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap();
        assert!(!gate.cooldown_elapsed(t0, t0));
        assert!(!gate.cooldown_elapsed(t0, t0 + ChronoDuration::hours(23)));
        assert!(gate.cooldown_elapsed(t0, t0 + ChronoDuration::hours(24)));

        let zero = UpdateGate::new(0, 3, 5.0);
        assert!(zero.cooldown_elapsed(t0, t0));
    }

    #[test]
    fn huge_cadence_falls_back_instead_of_panicking() {
        let t0 = Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap();
        for days in [200_000_000_000_000, i64::MAX, -5] {
            let gate = UpdateGate::new(days, 3, 5.0);
            assert_eq!(gate.cadence_days, DEFAULT_UPDATE_FREQUENCY_DAYS);
            assert!(gate.cooldown_elapsed(t0, t0 + ChronoDuration::days(1)));
        }
    }
}

//! # Radar aggregation
//! Ranks enriched records, buckets them per tier, and merges the freshest
//! top entries with the curated baseline.
//!
//! Output is structured (`RadarEntry`); turning it into markdown is left to
//! `publish`.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::BaselineConfig;
use crate::ingest::types::{Tier, TrendRecord};

pub const HIGH_RELEVANCE_ABOVE: f32 = 0.7;
pub const POSITIVE_SENTIMENT_ABOVE: f32 = 0.3;
/// Fresh entries surfaced per tier per run.
pub const FRESH_PER_TIER: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    HighRelevance,
    PositiveSentiment,
}

/// A scored record reduced to what the radar shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendEntry {
    pub name: String,
    pub language: Option<String>,
    pub markers: BTreeSet<Marker>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RadarEntry {
    /// Hand-curated text, already in display form.
    Curated { text: String },
    Trend(TrendEntry),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Radar {
    pub tiers: BTreeMap<Tier, Vec<RadarEntry>>,
}

impl Radar {
    pub fn entries(&self, tier: Tier) -> &[RadarEntry] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Sort by (relevance, sentiment) descending. Stable, so fetch order breaks exact ties.
pub fn rank(records: &mut [TrendRecord]) {
    records.sort_by(|a, b| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then_with(|| b.sentiment_score.total_cmp(&a.sentiment_score))
    });
}

pub fn entry_for(record: &TrendRecord) -> TrendEntry {
    let mut markers = BTreeSet::new();
    if record.relevance_score > HIGH_RELEVANCE_ABOVE {
        markers.insert(Marker::HighRelevance);
    }
    if record.sentiment_score > POSITIVE_SENTIMENT_ABOVE {
        markers.insert(Marker::PositiveSentiment);
    }
    TrendEntry {
        name: record.name.clone(),
        language: record.language.clone().filter(|l| !l.is_empty()),
        markers,
    }
}

/// Bucket already-ranked records per tier, skipping repeated names inside a tier.
pub fn bucket(ranked: &[TrendRecord]) -> BTreeMap<Tier, Vec<TrendEntry>> {
    let mut out: BTreeMap<Tier, Vec<TrendEntry>> =
        Tier::ALL.iter().map(|t| (*t, Vec::new())).collect();
    let mut seen: BTreeMap<Tier, HashSet<String>> = BTreeMap::new();

    for rec in ranked {
        if !seen.entry(rec.category).or_default().insert(rec.name.clone()) {
            continue;
        }
        out.entry(rec.category).or_default().push(entry_for(rec));
    }
    out
}

/// How many baseline entries survive: half (rounded down), at least one,
/// never more than exist.
pub fn baseline_keep(len: usize) -> usize {
    (len / 2).max(1).min(len)
}

pub fn merge_with_baseline(
    fresh: BTreeMap<Tier, Vec<TrendEntry>>,
    baseline: &BaselineConfig,
) -> Radar {
    let mut fresh = fresh;
    let mut tiers = BTreeMap::new();
    for tier in Tier::ALL {
        let curated = baseline.for_tier(tier);
        let keep = baseline_keep(curated.len());
        let mut items: Vec<RadarEntry> = curated[..keep]
            .iter()
            .map(|t| RadarEntry::Curated { text: t.clone() })
            .collect();
        items.extend(
            fresh
                .remove(&tier)
                .unwrap_or_default()
                .into_iter()
                .take(FRESH_PER_TIER)
                .map(RadarEntry::Trend),
        );
        tiers.insert(tier, items);
    }
    Radar { tiers }
}

/// rank -> bucket -> merge, without touching the caller's order.
pub fn build_radar(records: &[TrendRecord], baseline: &BaselineConfig) -> Radar {
    let mut ranked = records.to_vec();
    rank(&mut ranked);
    merge_with_baseline(bucket(&ranked), baseline)
}

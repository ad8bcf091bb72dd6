//! Persisted state of the last successful update.
//!
//! Always replaced wholesale (temp file + rename). The gate reads it through a
//! lenient view that only needs `last_updated` and the record names, so older
//! snapshot files still gate correctly.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::capabilities::Capability;
use crate::error::{RadarError, Result};
use crate::ingest::types::{Tier, TrendRecord, NEUTRAL_RELEVANCE, NEUTRAL_SENTIMENT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub avg_sentiment: f32,
    pub avg_relevance: f32,
    pub categories_distribution: BTreeMap<Tier, usize>,
}

impl SnapshotSummary {
    pub fn from_records(records: &[TrendRecord]) -> Self {
        let mut dist: BTreeMap<Tier, usize> = Tier::ALL.iter().map(|t| (*t, 0)).collect();
        for r in records {
            *dist.entry(r.category).or_default() += 1;
        }
        let (avg_sentiment, avg_relevance) = if records.is_empty() {
            (NEUTRAL_SENTIMENT, NEUTRAL_RELEVANCE)
        } else {
            let n = records.len() as f64;
            let s: f64 = records.iter().map(|r| r.sentiment_score as f64).sum();
            let rel: f64 = records.iter().map(|r| r.relevance_score as f64).sum();
            ((s / n) as f32, (rel / n) as f32)
        };
        Self {
            avg_sentiment,
            avg_relevance,
            categories_distribution: dist,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarSnapshot {
    pub last_updated: DateTime<Utc>,
    pub ai_enhanced: bool,
    pub enrichment_capabilities_used: BTreeSet<Capability>,
    pub total_trends: usize,
    #[serde(rename = "trends")]
    pub records: Vec<TrendRecord>,
    pub insights: SnapshotSummary,
}

impl RadarSnapshot {
    /// Build a snapshot; the summary is always derived from `records`.
    pub fn new(
        records: Vec<TrendRecord>,
        capabilities_used: impl IntoIterator<Item = Capability>,
        now: DateTime<Utc>,
    ) -> Self {
        let enrichment_capabilities_used: BTreeSet<Capability> =
            capabilities_used.into_iter().collect();
        Self {
            last_updated: now,
            ai_enhanced: !enrichment_capabilities_used.is_empty(),
            enrichment_capabilities_used,
            total_trends: records.len(),
            insights: SnapshotSummary::from_records(&records),
            records,
        }
    }

    pub fn names(&self) -> HashSet<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }
}

/// What the update gate needs from the prior run.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorState {
    pub last_updated: DateTime<Utc>,
    pub names: HashSet<String>,
}

impl From<&RadarSnapshot> for PriorState {
    fn from(s: &RadarSnapshot) -> Self {
        Self {
            last_updated: s.last_updated,
            names: s.names(),
        }
    }
}

#[derive(Deserialize)]
struct PriorView {
    #[serde(default = "epoch_default", deserialize_with = "lenient_timestamp")]
    last_updated: DateTime<Utc>,
    #[serde(default)]
    trends: Vec<NameOnly>,
}

#[derive(Deserialize)]
struct NameOnly {
    name: String,
}

fn epoch_default() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// RFC 3339, or a naive ISO timestamp read as UTC.
fn lenient_timestamp<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(d)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(serde::de::Error::custom(format!("unrecognized timestamp: {raw}")))
}

pub fn parse_prior_state(raw: &str) -> Result<PriorState> {
    let view: PriorView =
        serde_json::from_str(raw).map_err(|e| RadarError::PersistenceCorruption(e.to_string()))?;
    Ok(PriorState {
        last_updated: view.last_updated,
        names: view.trends.into_iter().map(|t| t.name).collect(),
    })
}

/// Durable storage of the last snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn exists(&self) -> bool;
    async fn load(&self) -> Result<RadarSnapshot>;
    async fn load_prior(&self) -> Result<PriorState> {
        self.load().await.map(|s| PriorState::from(&s))
    }
    async fn replace(&self, snapshot: &RadarSnapshot) -> Result<()>;
}

/// Pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    async fn load(&self) -> Result<RadarSnapshot> {
        let raw = fs::read_to_string(&self.path).await?;
        serde_json::from_str(&raw).map_err(|e| RadarError::PersistenceCorruption(e.to_string()))
    }

    async fn load_prior(&self) -> Result<PriorState> {
        let raw = fs::read_to_string(&self.path).await?;
        parse_prior_state(&raw)
    }

    async fn replace(&self, snapshot: &RadarSnapshot) -> Result<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        write_atomic(&self.path, &json).await
    }
}

/// Write to `<path>.tmp` and rename over the target.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

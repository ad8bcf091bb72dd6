//! Publish boundary: markdown rendering and delimited-section replacement.
//!
//! Everything outside the delimiters is left byte-for-byte untouched, and
//! re-publishing identical input reproduces identical output.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::config::PublishConfig;
use crate::error::{RadarError, Result};
use crate::ingest::types::Tier;
use crate::radar::{Marker, Radar, RadarEntry, TrendEntry};
use crate::snapshot::write_atomic;

fn tier_emoji(tier: Tier) -> &'static str {
    match tier {
        Tier::Adopt => "✅",
        Tier::Trial => "🧪",
        Tier::Assess => "👀",
        Tier::Avoid => "⛔",
    }
}

fn marker_glyph(m: Marker) -> &'static str {
    match m {
        Marker::HighRelevance => "🔥",
        Marker::PositiveSentiment => "⭐",
    }
}

pub fn format_trend(e: &TrendEntry) -> String {
    let mut s = format!("**{}**", e.name);
    if let Some(lang) = &e.language {
        let _ = write!(s, " ({lang})");
    }
    for m in &e.markers {
        s.push(' ');
        s.push_str(marker_glyph(*m));
    }
    s
}

pub fn format_entry(entry: &RadarEntry) -> String {
    match entry {
        RadarEntry::Curated { text } => text.clone(),
        RadarEntry::Trend(e) => format_trend(e),
    }
}

/// Markdown body placed between the radar delimiters.
pub fn render_radar(radar: &Radar, cfg: &PublishConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", cfg.heading);
    let _ = writeln!(out, "{}", cfg.subtitle);
    out.push('\n');
    for tier in Tier::ALL {
        let _ = writeln!(
            out,
            "<details><summary>{} {}</summary>",
            tier_emoji(tier),
            tier.title()
        );
        out.push('\n');
        for entry in radar.entries(tier) {
            let _ = writeln!(out, "- {}", format_entry(entry));
        }
        out.push_str("</details>\n\n");
    }
    out.trim_end().to_string()
}

/// Replace whatever sits between `start` and `end` with `body`.
/// Delimiters are kept; a missing delimiter is an error and the document is not touched.
pub fn replace_section(doc: &str, start: &str, end: &str, body: &str) -> Result<String> {
    let s = doc
        .find(start)
        .ok_or_else(|| RadarError::Publish(format!("start delimiter not found: {start}")))?;
    let inner_from = s + start.len();
    let e_rel = doc[inner_from..]
        .find(end)
        .ok_or_else(|| RadarError::Publish(format!("end delimiter not found: {end}")))?;
    let inner_to = inner_from + e_rel;

    let mut out = String::with_capacity(doc.len() + body.len());
    out.push_str(&doc[..inner_from]);
    out.push('\n');
    out.push_str(body.trim_matches('\n'));
    out.push('\n');
    out.push_str(&doc[inner_to..]);
    Ok(out)
}

/// Writes a rendered radar into the target document.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Returns whether the document changed.
    async fn publish(&self, radar: &Radar) -> Result<bool>;
}

pub struct ReadmePublisher {
    path: PathBuf,
    cfg: PublishConfig,
}

impl ReadmePublisher {
    pub fn new(path: impl Into<PathBuf>, cfg: PublishConfig) -> Self {
        Self {
            path: path.into(),
            cfg,
        }
    }
}

#[async_trait]
impl Publisher for ReadmePublisher {
    async fn publish(&self, radar: &Radar) -> Result<bool> {
        let body = render_radar(radar, &self.cfg);
        replace_in_file(&self.path, &self.cfg.radar_start, &self.cfg.radar_end, &body).await
    }
}

async fn replace_in_file(path: &Path, start: &str, end: &str, body: &str) -> Result<bool> {
    let doc = fs::read_to_string(path).await?;
    let updated = replace_section(&doc, start, end, body)?;
    if updated == doc {
        info!(target: "publish", path = %path.display(), "section unchanged");
        return Ok(false);
    }
    write_atomic(path, updated.as_bytes()).await?;
    info!(target: "publish", path = %path.display(), "section updated");
    Ok(true)
}

// ------------------------------------------------------------
// Now / Next / Exploring block
// ------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NowNext {
    pub now: String,
    pub next: String,
    pub exploring: String,
}

pub fn render_now_next(n: &NowNext) -> String {
    format!(
        "- **Now:** {}\n- **Next:** {}\n- **Exploring:** {}",
        n.now, n.next, n.exploring
    )
}

/// Render `now.json` into the NOW_NEXT section of the document.
pub async fn publish_now_next(readme: &Path, now_json: &Path, cfg: &PublishConfig) -> Result<bool> {
    let raw = fs::read_to_string(now_json).await?;
    let n: NowNext = serde_json::from_str(&raw)
        .map_err(|e| RadarError::Config(format!("{}: {e}", now_json.display())))?;
    replace_in_file(
        readme,
        &cfg.now_next_start,
        &cfg.now_next_end,
        &render_now_next(&n),
    )
    .await
}

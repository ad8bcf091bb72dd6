// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{TrendRecord, TrendSource};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_records_total", "Records returned by providers.");
        describe_counter!("ingest_dedup_total", "Records dropped as duplicate names.");
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider transport/parse errors (treated as empty)."
        );
        describe_histogram!("ingest_fetch_ms", "Provider fetch time in milliseconds.");
    });
}

/// Normalize free text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| {
        regex::Regex::new(r"(?is)</?[a-z][^>]*>").expect("tag regex")
    });
    out = re_tags.replace_all(&out, "").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > 500 {
        out = out.chars().take(500).collect();
    }
    out
}

/// Keep the first record for each name, preserving order.
/// Returns (kept, dropped_count).
pub fn dedup_by_name(records: Vec<TrendRecord>) -> (Vec<TrendRecord>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = 0usize;
    for rec in records {
        if seen.insert(rec.name.clone()) {
            kept.push(rec);
        } else {
            dropped += 1;
        }
    }
    (kept, dropped)
}

/// Fetch from every source in order, concatenate, dedup by name.
/// A failing source contributes nothing.
pub async fn fetch_all(sources: &[Box<dyn TrendSource>]) -> Vec<TrendRecord> {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for src in sources {
        let t0 = std::time::Instant::now();
        match src.fetch_latest().await {
            Ok(mut v) => {
                counter!("ingest_records_total", "source" => src.name()).increment(v.len() as u64);
                tracing::debug!(target: "ingest", source = src.name(), count = v.len(), "fetched");
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = %e, source = src.name(), "provider error, using empty result");
                counter!("ingest_provider_errors_total", "source" => src.name()).increment(1);
            }
        }
        histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    }

    let (kept, dropped) = dedup_by_name(raw);
    counter!("ingest_dedup_total").increment(dropped as u64);
    tracing::info!(target: "ingest", kept = kept.len(), duplicates = dropped, "fetch complete");
    kept
}

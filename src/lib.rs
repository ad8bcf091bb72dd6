// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod capabilities;
pub mod config;
pub mod error;
pub mod gate;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod publish;
pub mod radar;
pub mod scoring;
pub mod snapshot;

// ---- Re-exports for stable public API ----
pub use crate::capabilities::{Capabilities, Capability};
pub use crate::config::{load_config_or_default, RadarConfig};
pub use crate::error::{RadarError, Result};
pub use crate::gate::{GateDecision, UpdateGate};
pub use crate::ingest::types::{Tier, TrendRecord, TrendSource};
pub use crate::pipeline::{Pipeline, RunOptions, RunOutcome};

// src/config/mod.rs
//! Configuration loading. TOML or JSON, chosen by extension and then by content.

pub mod schema;

pub use schema::{
    BaselineConfig, CapabilitiesConfig, EmbeddingProvider, PathsConfig, PublishConfig,
    RadarConfig, SimilarityKind, SourcesConfig,
};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{RadarError, Result};

pub const ENV_CONFIG_PATH: &str = "RADAR_CONFIG_PATH";

const FALLBACK_PATHS: [&str; 2] = ["config/tech_radar.toml", "data/tech_radar_config.json"];

/// Load config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<RadarConfig> {
    if !path.exists() {
        return Err(RadarError::ConfigMissing(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
        .map_err(|e| RadarError::Config(format!("{}: {e}", path.display())))
}

/// Resolve and load config, never failing:
/// 1) explicit path
/// 2) $RADAR_CONFIG_PATH
/// 3) config/tech_radar.toml
/// 4) data/tech_radar_config.json
/// 5) built-in defaults
pub fn load_config_or_default(explicit: Option<&Path>) -> RadarConfig {
    let candidate = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from))
        .or_else(|| {
            FALLBACK_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists())
        });

    let Some(path) = candidate else {
        info!(target: "config", "no config file found, using defaults");
        return RadarConfig::default();
    };

    match load_config_from(&path) {
        Ok(cfg) => {
            info!(target: "config", path = %path.display(), "config loaded");
            cfg
        }
        Err(e) => {
            warn!(target: "config", error = %e, "falling back to default config");
            RadarConfig::default()
        }
    }
}

fn parse_config(s: &str, hint_ext: &str) -> std::result::Result<RadarConfig, String> {
    let looks_json = s.trim_start().starts_with('{');
    let try_toml_first = hint_ext == "toml" || (hint_ext != "json" && !looks_json);

    let parsed = if try_toml_first {
        toml::from_str::<RadarConfig>(s)
            .map_err(|e| e.to_string())
            .or_else(|toml_err| {
                serde_json::from_str::<RadarConfig>(s).map_err(|_| toml_err)
            })
    } else {
        serde_json::from_str::<RadarConfig>(s)
            .map_err(|e| e.to_string())
            .or_else(|json_err| toml::from_str::<RadarConfig>(s).map_err(|_| json_err))
    };

    parsed.map(RadarConfig::sanitize)
}

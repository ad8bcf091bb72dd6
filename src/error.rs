//! Error taxonomy for the radar pipeline.
//!
//! None of these are fatal to a run: transport failures degrade to empty fetches,
//! enrichment failures degrade to the keyword heuristics, a corrupt snapshot is
//! treated as absent, and missing config falls back to defaults.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RadarError>;

#[derive(Error, Debug)]
pub enum RadarError {
    /// Network/HTTP failure while talking to an upstream source.
    #[error("transport failure ({source_name}): {message}")]
    Transport {
        source_name: &'static str,
        message: String,
    },

    /// An optional enrichment capability failed for one record/field.
    #[error("enrichment failure ({capability}): {message}")]
    Enrichment {
        capability: &'static str,
        message: String,
    },

    /// Prior snapshot exists but cannot be read or parsed.
    #[error("snapshot unreadable: {0}")]
    PersistenceCorruption(String),

    /// No configuration file found at the given location.
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    /// Configuration present but malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Target document lacks the expected section delimiters.
    #[error("publish error: {0}")]
    Publish(String),

    /// The metrics recorder could not be installed.
    #[error("metrics error: {0}")]
    Metrics(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RadarError {
    pub fn transport(source_name: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            source_name,
            message: err.to_string(),
        }
    }

    pub fn enrichment(capability: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Enrichment {
            capability,
            message: err.to_string(),
        }
    }
}

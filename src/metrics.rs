//! Prometheus recorder rendered to a node-exporter style textfile at the end of a run.

use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;

use crate::error::{RadarError, Result};
use crate::snapshot::write_atomic;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global recorder. Fails if another recorder is already installed.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| RadarError::Metrics(format!("prometheus recorder: {e}")))?;
        gauge!("radar_build_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
        Ok(Self { handle })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    pub async fn write_textfile(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.render().as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_recorder_is_a_metrics_error() {
        let first = Metrics::init().unwrap();
        assert!(first.render().contains("radar_build_info"));
        assert!(matches!(Metrics::init(), Err(RadarError::Metrics(_))));
    }
}

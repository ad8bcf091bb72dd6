// src/ingest/providers/mod.rs
pub mod github;
pub mod stackoverflow;

use std::time::Duration;

use crate::config::SourcesConfig;
use crate::error::{RadarError, Result};
use crate::ingest::types::TrendSource;

pub use github::GitHubSearchProvider;
pub use stackoverflow::StackOverflowTagsProvider;

/// Shared HTTP client with explicit timeouts; expiry surfaces as a transport error.
pub fn build_http_client(cfg: &SourcesConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .connect_timeout(Duration::from_secs(cfg.timeout_secs.min(10)))
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .map_err(|e| RadarError::transport("http-client", e))
}

/// The two live sources in their canonical order (GitHub first, then Stack Overflow).
pub fn default_sources(cfg: &SourcesConfig) -> Result<Vec<Box<dyn TrendSource>>> {
    let client = build_http_client(cfg)?;
    let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.trim().is_empty());
    Ok(vec![
        Box::new(GitHubSearchProvider::from_http(client.clone(), cfg, token)),
        Box::new(StackOverflowTagsProvider::from_http(client, cfg)),
    ])
}

/// Fetch a body, mapping non-success status and transport errors to `Transport`.
pub(crate) async fn get_body(
    source_name: &'static str,
    req: reqwest::RequestBuilder,
) -> Result<String> {
    let resp = req
        .send()
        .await
        .map_err(|e| RadarError::transport(source_name, e))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(RadarError::transport(
            source_name,
            format!("upstream returned {status}"),
        ));
    }
    resp.text()
        .await
        .map_err(|e| RadarError::transport(source_name, e))
}

// src/ingest/providers/github.rs
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SourcesConfig;
use crate::error::{RadarError, Result};
use crate::ingest::normalize_text;
use crate::ingest::types::{Popularity, SourceKind, TrendRecord, TrendSource};

const NAME: &str = "GitHub";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Repo>,
}

#[derive(Debug, Deserialize)]
struct Repo {
    name: String,
    full_name: Option<String>,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    html_url: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
}

/// Repository search ordered by stars.
pub struct GitHubSearchProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        url: String,
        query: String,
        page_size: u32,
        token: Option<String>,
    },
}

impl GitHubSearchProvider {
    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn from_http(client: reqwest::Client, cfg: &SourcesConfig, token: Option<String>) -> Self {
        Self {
            mode: Mode::Http {
                client,
                url: format!(
                    "{}/search/repositories",
                    cfg.github_api_url.trim_end_matches('/')
                ),
                query: cfg.github_query.clone(),
                page_size: cfg.github_page_size,
                token,
            },
        }
    }

    /// Parse a search response. Repos without a language or description are dropped.
    pub fn parse_body(body: &str) -> Result<Vec<TrendRecord>> {
        let resp: SearchResponse = serde_json::from_str(body)
            .map_err(|e| RadarError::transport(NAME, format!("parse search response: {e}")))?;

        let mut out = Vec::with_capacity(resp.items.len());
        for repo in resp.items {
            let language = repo.language.filter(|l| !l.trim().is_empty());
            let description = repo
                .description
                .as_deref()
                .map(normalize_text)
                .filter(|d| !d.is_empty());
            let (Some(language), Some(description)) = (language, description) else {
                continue;
            };

            let mut rec = TrendRecord::new(
                repo.name,
                SourceKind::GitHub,
                Popularity::Repository {
                    stars: repo.stargazers_count,
                    forks: repo.forks_count,
                },
            )
            .with_description(description)
            .with_language(language);
            rec.url = repo.html_url;
            rec.full_name = repo.full_name;
            rec.topics = repo.topics;
            rec.created_at = repo.created_at;
            rec.updated_at = repo.updated_at;
            out.push(rec);
        }
        Ok(out)
    }
}

#[async_trait]
impl TrendSource for GitHubSearchProvider {
    async fn fetch_latest(&self) -> Result<Vec<TrendRecord>> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body),
            Mode::Http {
                client,
                url,
                query,
                page_size,
                token,
            } => {
                let per_page = page_size.to_string();
                let mut req = client
                    .get(url.as_str())
                    .header("Accept", "application/vnd.github+json")
                    .query(&[
                        ("q", query.as_str()),
                        ("sort", "stars"),
                        ("order", "desc"),
                        ("per_page", per_page.as_str()),
                    ]);
                if let Some(t) = token {
                    req = req.bearer_auth(t);
                }
                let body = super::get_body(NAME, req).await?;
                Self::parse_body(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

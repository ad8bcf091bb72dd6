// src/ingest/providers/stackoverflow.rs
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SourcesConfig;
use crate::error::{RadarError, Result};
use crate::ingest::types::{Popularity, SourceKind, TrendRecord, TrendSource};

const NAME: &str = "StackOverflow";

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    items: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
    #[serde(default)]
    count: u64,
}

/// Most popular Stack Overflow tags.
pub struct StackOverflowTagsProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        url: String,
        page_size: u32,
    },
}

impl StackOverflowTagsProvider {
    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn from_http(client: reqwest::Client, cfg: &SourcesConfig) -> Self {
        Self {
            mode: Mode::Http {
                client,
                url: format!("{}/tags", cfg.stackexchange_api_url.trim_end_matches('/')),
                page_size: cfg.stackoverflow_page_size,
            },
        }
    }

    pub fn parse_body(body: &str) -> Result<Vec<TrendRecord>> {
        let resp: TagsResponse = serde_json::from_str(body)
            .map_err(|e| RadarError::transport(NAME, format!("parse tags response: {e}")))?;

        Ok(resp
            .items
            .into_iter()
            .filter(|t| !t.name.trim().is_empty())
            .map(|t| {
                let description = format!(
                    "Popular {} technology with {} questions",
                    t.name, t.count
                );
                TrendRecord::new(
                    t.name,
                    SourceKind::StackOverflow,
                    Popularity::Tag { questions: t.count },
                )
                .with_description(description)
            })
            .collect())
    }
}

#[async_trait]
impl TrendSource for StackOverflowTagsProvider {
    async fn fetch_latest(&self) -> Result<Vec<TrendRecord>> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body),
            Mode::Http {
                client,
                url,
                page_size,
            } => {
                // Stack Exchange always gzips; reqwest handles it when the body is read.
                let pagesize = page_size.to_string();
                let req = client.get(url.as_str()).query(&[
                    ("order", "desc"),
                    ("sort", "popular"),
                    ("site", "stackoverflow"),
                    ("pagesize", pagesize.as_str()),
                ]);
                let body = super::get_body(NAME, req).await?;
                Self::parse_body(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

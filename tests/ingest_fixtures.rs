// tests/ingest_fixtures.rs
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tech_radar_updater::config::SourcesConfig;
use tech_radar_updater::error::{RadarError, Result};
use tech_radar_updater::ingest::fetch_all;
use tech_radar_updater::ingest::providers::{
    build_http_client, GitHubSearchProvider, StackOverflowTagsProvider,
};
use tech_radar_updater::ingest::types::{Popularity, SourceKind, Tier, TrendRecord, TrendSource};

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{name}")).expect("fixture")
}

fn fixture_sources() -> Vec<Box<dyn TrendSource>> {
    vec![
        Box::new(GitHubSearchProvider::from_fixture(&fixture("github_search.json"))),
        Box::new(StackOverflowTagsProvider::from_fixture(&fixture(
            "stackoverflow_tags.json",
        ))),
    ]
}

struct DownSource;

#[async_trait]
impl TrendSource for DownSource {
    async fn fetch_latest(&self) -> Result<Vec<TrendRecord>> {
        Err(RadarError::transport("down", "connection reset"))
    }
    fn name(&self) -> &'static str {
        "down"
    }
}

#[tokio::test]
async fn github_fixture_drops_incomplete_repos() {
    let p = GitHubSearchProvider::from_fixture(&fixture("github_search.json"));
    let recs = p.fetch_latest().await.unwrap();
    let names: Vec<_> = recs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["ruff", "agent-kit", "oldlib", "tracekit"]);

    let ruff = &recs[0];
    assert_eq!(ruff.source, SourceKind::GitHub);
    assert_eq!(ruff.language.as_deref(), Some("Rust"));
    assert_eq!(
        ruff.popularity,
        Popularity::Repository {
            stars: 38000,
            forks: 1300
        }
    );
    assert_eq!(ruff.full_name.as_deref(), Some("astral-sh/ruff"));
    // enrichment fields are pending defaults
    assert_eq!(ruff.category, Tier::Assess);
    assert_eq!(ruff.sentiment_score, 0.0);
    assert_eq!(ruff.relevance_score, 0.5);

    assert_eq!(recs[3].description, "Tools & utilities for observability");
}

#[tokio::test]
async fn stackoverflow_fixture_maps_tags() {
    let p = StackOverflowTagsProvider::from_fixture(&fixture("stackoverflow_tags.json"));
    let recs = p.fetch_latest().await.unwrap();
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[1].name, "python");
    assert_eq!(
        recs[1].description,
        "Popular python technology with 2200000 questions"
    );
    assert_eq!(recs[1].popularity, Popularity::Tag { questions: 2200000 });
    assert!(recs[1].language.is_none());
}

#[tokio::test]
async fn fetch_all_concatenates_and_dedups_first_wins() {
    let recs = fetch_all(&fixture_sources()).await;
    let names: Vec<_> = recs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["ruff", "agent-kit", "oldlib", "tracekit", "javascript", "python"]
    );
    // the GitHub copy of "ruff" survived, not the tag
    assert_eq!(recs[0].source, SourceKind::GitHub);
}

#[tokio::test]
async fn failing_source_contributes_nothing() {
    let sources: Vec<Box<dyn TrendSource>> = vec![
        Box::new(DownSource),
        Box::new(StackOverflowTagsProvider::from_fixture(&fixture(
            "stackoverflow_tags.json",
        ))),
    ];
    let recs = fetch_all(&sources).await;
    assert_eq!(recs.len(), 3);
}

#[tokio::test]
async fn malformed_body_is_a_transport_error() {
    let p = GitHubSearchProvider::from_fixture("<html>rate limited</html>");
    assert!(matches!(
        p.fetch_latest().await,
        Err(RadarError::Transport { .. })
    ));
}

#[tokio::test]
async fn unreachable_upstream_yields_empty() {
    let cfg = SourcesConfig {
        github_api_url: "http://127.0.0.1:9".into(),
        stackexchange_api_url: "http://127.0.0.1:9".into(),
        timeout_secs: 2,
        ..SourcesConfig::default()
    };
    let client = build_http_client(&cfg).unwrap();
    let sources: Vec<Box<dyn TrendSource>> = vec![
        Box::new(GitHubSearchProvider::from_http(client.clone(), &cfg, None)),
        Box::new(StackOverflowTagsProvider::from_http(client, &cfg)),
    ];
    assert!(fetch_all(&sources).await.is_empty());
}

fn local_cfg(addr: std::net::SocketAddr) -> SourcesConfig {
    SourcesConfig {
        github_api_url: format!("http://{addr}"),
        stackexchange_api_url: format!("http://{addr}"),
        timeout_secs: 1,
        ..SourcesConfig::default()
    }
}

fn http_sources(cfg: &SourcesConfig) -> Vec<Box<dyn TrendSource>> {
    let client = build_http_client(cfg).unwrap();
    vec![
        Box::new(GitHubSearchProvider::from_http(client.clone(), cfg, None)),
        Box::new(StackOverflowTagsProvider::from_http(client, cfg)),
    ]
}

#[tokio::test]
async fn non_success_status_yields_empty() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // valid body, but served with 503
    let body = fixture("stackoverflow_tags.json");
    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                return;
            };
            let body = body.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = sock.read(&mut buf).await;
                let resp = format!(
                    "HTTP/1.1 503 Service Unavailable\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });

    let recs = fetch_all(&http_sources(&local_cfg(addr))).await;
    assert!(recs.is_empty());
}

#[tokio::test]
async fn stalled_upstream_times_out_to_empty() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // accept and hold the connection without ever answering
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((sock, _)) = listener.accept().await {
            held.push(sock);
        }
    });

    let started = Instant::now();
    let recs = fetch_all(&http_sources(&local_cfg(addr))).await;
    let elapsed = started.elapsed();
    assert!(recs.is_empty());
    // two sources, one second each, plus slack
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
    assert!(elapsed >= Duration::from_millis(900), "took {elapsed:?}");
}

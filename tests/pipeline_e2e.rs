// tests/pipeline_e2e.rs
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::{Path, PathBuf};
use tech_radar_updater::capabilities::Capabilities;
use tech_radar_updater::config::RadarConfig;
use tech_radar_updater::gate::UpdateReason;
use tech_radar_updater::ingest::providers::{GitHubSearchProvider, StackOverflowTagsProvider};
use tech_radar_updater::error::Result;
use tech_radar_updater::ingest::types::{Tier, TrendRecord, TrendSource};
use tech_radar_updater::pipeline::{Pipeline, RunOptions, RunOutcome};
use tech_radar_updater::publish::ReadmePublisher;
use tech_radar_updater::snapshot::{JsonSnapshotStore, SnapshotStore};

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{name}")).expect("fixture")
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap()
}

struct Workspace {
    _dir: tempfile::TempDir,
    readme: PathBuf,
    snapshot: PathBuf,
}

fn workspace(readme_body: &str) -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let readme = dir.path().join("README.md");
    std::fs::write(&readme, readme_body).unwrap();
    let snapshot = dir.path().join("data/tech_trends.json");
    Workspace {
        _dir: dir,
        readme,
        snapshot,
    }
}

fn pipeline(ws: &Workspace) -> Pipeline {
    let cfg = RadarConfig::default();
    let sources: Vec<Box<dyn TrendSource>> = vec![
        Box::new(GitHubSearchProvider::from_fixture(&fixture("github_search.json"))),
        Box::new(StackOverflowTagsProvider::from_fixture(&fixture(
            "stackoverflow_tags.json",
        ))),
    ];
    let store = JsonSnapshotStore::new(&ws.snapshot);
    let publisher = ReadmePublisher::new(&ws.readme, cfg.publish.clone());
    Pipeline::new(
        cfg,
        Capabilities::none(),
        sources,
        Box::new(store),
        Box::new(publisher),
    )
}

fn read(p: &Path) -> String {
    std::fs::read_to_string(p).unwrap()
}

#[tokio::test]
async fn first_run_publishes_and_persists() {
    let ws = workspace(&fixture("README.md"));
    let p = pipeline(&ws);

    let outcome = p.run(RunOptions::default(), now()).await.unwrap();
    let RunOutcome::Updated(report) = outcome else {
        panic!("expected an update on first run");
    };
    assert_eq!(report.reason, UpdateReason::NoPriorState);
    assert!(report.published);
    assert!(report.persisted);

    let readme = read(&ws.readme);
    assert!(readme.starts_with("# Hi there\n\nSome intro text that must survive every update."));
    assert!(readme.contains("### Tech Radar 🤖"));
    assert!(readme.contains("- **FastAPI**\n- **Terraform**\n- **ruff** (Rust) ⭐\n</details>"));
    assert!(readme.contains("- **agent-kit** (Python)"));
    assert!(readme.contains("- **oldlib** (C)\n</details>"));
    assert!(!readme.contains("old radar"));
    assert!(readme.ends_with("<!-- TECH_RADAR:END -->\n\n### Focus\nFooter text.\n"));
    // the other delimited section is untouched
    assert!(readme.contains("<!-- NOW_NEXT:START -->\n- placeholder\n<!-- NOW_NEXT:END -->"));

    let snap = JsonSnapshotStore::new(&ws.snapshot).load().await.unwrap();
    assert_eq!(snap.total_trends, 6);
    assert!(!snap.ai_enhanced);
    assert!(snap.enrichment_capabilities_used.is_empty());
    assert_eq!(snap.last_updated, now());
    assert_eq!(snap.insights.categories_distribution[&Tier::Adopt], 1);
    assert_eq!(snap.insights.categories_distribution[&Tier::Assess], 3);
    assert!((snap.insights.avg_relevance - 0.5).abs() < 1e-6);
}

#[tokio::test]
async fn second_run_inside_cooldown_skips() {
    let ws = workspace(&fixture("README.md"));
    let p = pipeline(&ws);
    p.run(RunOptions::default(), now()).await.unwrap();
    let after_first = read(&ws.readme);

    let outcome = p
        .run(RunOptions::default(), now() + Duration::hours(2))
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Skipped(_)));
    assert_eq!(read(&ws.readme), after_first);
}

#[tokio::test]
async fn unchanged_names_after_cooldown_skip() {
    let ws = workspace(&fixture("README.md"));
    let p = pipeline(&ws);
    p.run(RunOptions::default(), now()).await.unwrap();

    let outcome = p
        .run(RunOptions::default(), now() + Duration::days(2))
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Skipped(_)));
}

#[tokio::test]
async fn forced_rerun_is_idempotent() {
    let ws = workspace(&fixture("README.md"));
    let p = pipeline(&ws);
    p.run(RunOptions::default(), now()).await.unwrap();
    let first = read(&ws.readme);

    let forced = RunOptions {
        force: true,
        dry_run: false,
    };
    let RunOutcome::Updated(report) = p.run(forced, now()).await.unwrap() else {
        panic!("forced run must update");
    };
    assert_eq!(report.reason, UpdateReason::Forced);
    assert!(!report.published, "identical input must not rewrite the document");
    assert_eq!(read(&ws.readme), first);
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let ws = workspace(&fixture("README.md"));
    let before = read(&ws.readme);
    let p = pipeline(&ws);

    let opts = RunOptions {
        force: false,
        dry_run: true,
    };
    let RunOutcome::Updated(report) = p.run(opts, now()).await.unwrap() else {
        panic!("dry run still scores");
    };
    assert!(report.rendered.contains("**ruff** (Rust) ⭐"));
    assert!(!report.persisted);
    assert_eq!(read(&ws.readme), before);
    assert!(!ws.snapshot.exists());
}

#[tokio::test]
async fn missing_delimiters_still_persist_snapshot() {
    let ws = workspace("# No markers here\n");
    let p = pipeline(&ws);

    let RunOutcome::Updated(report) = p.run(RunOptions::default(), now()).await.unwrap() else {
        panic!("expected update");
    };
    assert!(!report.published);
    assert!(report.persisted);
    assert_eq!(read(&ws.readme), "# No markers here\n");
    assert!(ws.snapshot.exists());
}

struct EmptySource;

#[async_trait]
impl TrendSource for EmptySource {
    async fn fetch_latest(&self) -> Result<Vec<TrendRecord>> {
        Ok(Vec::new())
    }
    fn name(&self) -> &'static str {
        "empty"
    }
}

#[tokio::test]
async fn empty_fetch_publishes_baseline_only() {
    let ws = workspace(&fixture("README.md"));
    let cfg = RadarConfig::default();
    let publisher = ReadmePublisher::new(&ws.readme, cfg.publish.clone());
    let p = Pipeline::new(
        cfg,
        Capabilities::none(),
        vec![Box::new(EmptySource)],
        Box::new(JsonSnapshotStore::new(&ws.snapshot)),
        Box::new(publisher),
    );

    let forced = RunOptions {
        force: true,
        dry_run: false,
    };
    let RunOutcome::Updated(report) = p.run(forced, now()).await.unwrap() else {
        panic!("forced run must update");
    };
    assert!(report.persisted);
    assert_eq!(report.snapshot.total_trends, 0);

    let readme = read(&ws.readme);
    assert!(readme.contains("- **FastAPI**"));
    assert!(!readme.contains("ruff"));
}

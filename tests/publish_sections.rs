// tests/publish_sections.rs
use tech_radar_updater::config::PublishConfig;
use tech_radar_updater::publish::publish_now_next;

#[tokio::test]
async fn now_next_replaces_only_its_section() {
    let dir = tempfile::tempdir().unwrap();
    let readme = dir.path().join("README.md");
    let template = std::fs::read_to_string("tests/fixtures/README.md").unwrap();
    std::fs::write(&readme, &template).unwrap();

    let now_json = dir.path().join("now.json");
    std::fs::write(
        &now_json,
        r#"{"now": "Shipping X", "next": "Trying Y", "exploring": "Reading Z"}"#,
    )
    .unwrap();

    let cfg = PublishConfig::default();
    assert!(publish_now_next(&readme, &now_json, &cfg).await.unwrap());

    let out = std::fs::read_to_string(&readme).unwrap();
    assert!(out.contains(
        "<!-- NOW_NEXT:START -->\n- **Now:** Shipping X\n- **Next:** Trying Y\n- **Exploring:** Reading Z\n<!-- NOW_NEXT:END -->"
    ));
    assert!(out.contains("<!-- TECH_RADAR:START -->\nold radar\n<!-- TECH_RADAR:END -->"));
    assert_eq!(out.replace(
        "- **Now:** Shipping X\n- **Next:** Trying Y\n- **Exploring:** Reading Z",
        "- placeholder",
    ), template);

    // second pass is a no-op
    assert!(!publish_now_next(&readme, &now_json, &cfg).await.unwrap());
}

#[tokio::test]
async fn malformed_now_json_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let readme = dir.path().join("README.md");
    std::fs::write(&readme, "<!-- NOW_NEXT:START -->\n<!-- NOW_NEXT:END -->\n").unwrap();
    let now_json = dir.path().join("now.json");
    std::fs::write(&now_json, r#"{"now": "only"}"#).unwrap();

    assert!(publish_now_next(&readme, &now_json, &PublishConfig::default())
        .await
        .is_err());
    assert_eq!(
        std::fs::read_to_string(&readme).unwrap(),
        "<!-- NOW_NEXT:START -->\n<!-- NOW_NEXT:END -->\n"
    );
}

#[test]
fn shipped_config_parses() {
    let cfg = tech_radar_updater::config::load_config_from(std::path::Path::new(
        "config/tech_radar.toml",
    ))
    .unwrap();
    assert_eq!(cfg.update_frequency_days, 14);
    assert!(cfg.interest_phrases().contains(&"llm agents".to_string()));
}

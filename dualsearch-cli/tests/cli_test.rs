#![allow(deprecated)] // Command::cargo_bin

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A command with every ambient DUALSEARCH_* variable removed.
fn dualsearch_cmd() -> Command {
    let mut cmd = Command::cargo_bin("dualsearch").unwrap();
    cmd.env_remove("DUALSEARCH_PRIMARY_URL")
        .env_remove("DUALSEARCH_SECONDARY_URL")
        .env_remove("DUALSEARCH_TIMEOUT_SECS")
        .env_remove("DUALSEARCH_CONFIG_DIR")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn help_lists_commands() {
    dualsearch_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("create-index"))
        .stdout(contains("search"));
}

#[test]
fn put_rejects_invalid_json() {
    dualsearch_cmd()
        .args([
            "--primary",
            "http://127.0.0.1:1",
            "put",
            "--instance",
            "i",
            "--index",
            "people",
            "--entity",
            "person",
            "--id",
            "1",
            "--doc",
            "{not json",
        ])
        .assert()
        .failure();
}

#[test]
fn unreachable_primary_is_reported() {
    dualsearch_cmd()
        .args([
            "--primary",
            "http://127.0.0.1:1",
            "--timeout-secs",
            "2",
            "delete-index",
            "--index-name",
            "people",
        ])
        .assert()
        .failure()
        .stderr(contains("primary client"));
}

#[tokio::test(flavor = "multi_thread")]
async fn get_reports_mismatch_between_clusters() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;
    for (server, name) in [(&primary, "A"), (&secondary, "B")] {
        Mock::given(method("GET"))
            .and(path("/people/_doc/i-person-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_source": {"name": name, "id": "1", "instance_id": "i", "entity_name": "person"}
            })))
            .mount(server)
            .await;
    }

    let (primary_uri, secondary_uri) = (primary.uri(), secondary.uri());
    tokio::task::spawn_blocking(move || {
        dualsearch_cmd()
            .args([
                "--primary",
                &primary_uri,
                "--secondary",
                &secondary_uri,
                "get",
                "--instance",
                "i",
                "--index",
                "people",
                "--entity",
                "person",
                "--id",
                "1",
            ])
            .assert()
            .failure()
            .stderr(contains("mismatch"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn search_prints_hits_as_json() {
    let primary = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {"hits": [{"_id": "i-person-1", "_source": {"name": "Jane Doe"}}]}
        })))
        .mount(&primary)
        .await;

    let primary_uri = primary.uri();
    tokio::task::spawn_blocking(move || {
        dualsearch_cmd()
            .args(["--primary", &primary_uri, "search", "--instance", "i", "--query", "jane"])
            .assert()
            .success()
            .stdout(contains("Jane Doe"));
    })
    .await
    .unwrap();
}

//! Bitbucket end-to-end resolution tests against a mock API server

mod helper;

use chrono::{TimeZone, Utc};
use mockito::{Matcher, Server};

use helper::{checker_for, mock_all_not_found, mock_json, mock_not_found, mock_text};
use vcs_update_check::config::CheckerConfig;
use vcs_update_check::vcs::types::Credentials;

const REPOSITORY: &str = "https://bitbucket.org/team/plugin";

#[tokio::test]
async fn resolves_latest_tag_with_signed_requests() {
    let mut server = Server::new_async().await;
    let readme = server
        .mock("GET", "/repositories/team/plugin/src/master/readme.txt")
        .match_query(Matcher::UrlEncoded("access_token".into(), "tok".into()))
        .with_status(404)
        .create_async()
        .await;
    let tags = server
        .mock("GET", "/repositories/team/plugin/refs/tags")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("sort".into(), "-target.date".into()),
            Matcher::UrlEncoded("pagelen".into(), "100".into()),
            Matcher::UrlEncoded("access_token".into(), "tok".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"values": [
                {"name": "1.9", "target": {"date": "2024-01-01T00:00:00+00:00"}},
                {"name": "1.10", "target": {"date": "2023-11-01T00:00:00+00:00"}}
            ]}"#,
        )
        .create_async()
        .await;

    let checker = checker_for(&server, &CheckerConfig::default());
    let reference = checker
        .check(REPOSITORY, "master", Some(Credentials::new("tok")))
        .await
        .unwrap()
        .unwrap();

    readme.assert_async().await;
    tags.assert_async().await;
    assert_eq!(reference.name, "1.10");
    assert_eq!(
        reference.updated,
        Some(Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(
        reference.download_url,
        "https://bitbucket.org/team/plugin/get/1.10.zip?access_token=tok"
    );
}

#[tokio::test]
async fn stable_tag_resolves_to_named_tag() {
    let mut server = Server::new_async().await;
    let readme = mock_text(
        &mut server,
        "/repositories/team/plugin/src/master/readme.txt",
        "=== Plugin ===\nRequires at least: 5.0\nStable tag: 3.1\n",
    )
    .await;
    let tag = mock_json(
        &mut server,
        "/repositories/team/plugin/refs/tags/3.1",
        r#"{"name": "3.1", "target": {"date": "2024-04-01T12:00:00+00:00"}}"#,
    )
    .await;

    let checker = checker_for(&server, &CheckerConfig::default());
    let reference = checker.check(REPOSITORY, "master", None).await.unwrap().unwrap();

    readme.assert_async().await;
    tag.assert_async().await;
    assert_eq!(reference.name, "3.1");
    assert_eq!(reference.version.as_deref(), Some("3.1"));
}

#[tokio::test]
async fn missing_stable_tag_falls_back_to_branch() {
    let mut server = Server::new_async().await;
    mock_text(
        &mut server,
        "/repositories/team/plugin/src/master/readme.txt",
        "Stable tag: 9.9\n",
    )
    .await;
    mock_not_found(&mut server, "/repositories/team/plugin/refs/tags/9.9").await;
    mock_json(&mut server, "/repositories/team/plugin/refs/tags", r#"{"values": []}"#).await;
    let branch = mock_json(
        &mut server,
        "/repositories/team/plugin/refs/branches/master",
        r#"{"name": "master", "target": {"date": "2024-10-01T00:00:00+00:00"}}"#,
    )
    .await;

    let checker = checker_for(&server, &CheckerConfig::default());
    let reference = checker.check(REPOSITORY, "master", None).await.unwrap().unwrap();

    branch.assert_async().await;
    assert_eq!(reference.name, "master");
    assert_eq!(
        reference.download_url,
        "https://bitbucket.org/team/plugin/get/master.zip"
    );
}

#[tokio::test]
async fn returns_none_when_every_lookup_is_not_found() {
    let mut server = Server::new_async().await;
    let mock = mock_all_not_found(&mut server).await;

    let checker = checker_for(&server, &CheckerConfig::default());
    let reference = checker.check(REPOSITORY, "master", None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(reference, None);
}

//! Mock VCS server utilities
#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mockito::{Matcher, Mock, ServerGuard};

use vcs_update_check::config::CheckerConfig;
use vcs_update_check::vcs::checker::UpdateChecker;
use vcs_update_check::vcs::rest::ClientOptions;

/// Create a checker whose clients send every API request to `server`
pub fn checker_for(server: &ServerGuard, config: &CheckerConfig) -> UpdateChecker {
    UpdateChecker::new(config).with_client_options(ClientOptions {
        api_base: Some(server.url()),
        ..config.client_options()
    })
}

/// JSON body of a file contents response carrying `text` as base64
pub fn encoded_file(text: &str) -> String {
    serde_json::json!({
        "content": STANDARD.encode(text),
        "encoding": "base64",
    })
    .to_string()
}

/// Mock a 200 JSON response for `path`, whatever the query string
pub async fn mock_json(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// Mock a 200 plain text response for `path`, whatever the query string
pub async fn mock_text(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body(body)
        .create_async()
        .await
}

/// Mock a 404 response for `path`, whatever the query string
pub async fn mock_not_found(server: &mut ServerGuard, path: &str) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"message": "Not Found"}"#)
        .create_async()
        .await
}

/// Mock a 404 response for every request
pub async fn mock_all_not_found(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", Matcher::Any)
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"message": "Not Found"}"#)
        .expect_at_least(1)
        .create_async()
        .await
}

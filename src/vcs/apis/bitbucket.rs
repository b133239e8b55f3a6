//! Bitbucket Cloud REST API (2.0) client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::vcs::api::VcsApi;
use crate::vcs::error::VcsError;
use crate::vcs::identity::RepositoryIdentity;
use crate::vcs::rest::{ClientOptions, RestClient, encode_path, encode_segment};
use crate::vcs::types::{Credentials, Provider, Reference, parse_timestamp};
use crate::vcs::version::find_latest_tag;

const DEFAULT_BASE_URL: &str = "https://api.bitbucket.org/2.0";

const DOWNLOAD_BASE_URL: &str = "https://bitbucket.org";

const AUTH_PARAM: &str = "access_token";

/// Largest page size the refs endpoint accepts
const TAGS_PAGE_LEN: &str = "100";

/// Paginated collection; only the first page is read
#[derive(Debug, Deserialize)]
struct Page<T> {
    values: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Target {
    date: Option<String>,
}

/// Tags and branches share the same shape
#[derive(Debug, Deserialize)]
struct Ref {
    name: String,
    target: Option<Target>,
}

impl Ref {
    fn updated(&self) -> Option<DateTime<Utc>> {
        self.target
            .as_ref()
            .and_then(|t| t.date.as_deref())
            .and_then(parse_timestamp)
    }
}

/// Client for a single Bitbucket repository
pub struct BitbucketApi {
    identity: RepositoryIdentity,
    default_branch: String,
    rest: RestClient,
}

impl BitbucketApi {
    /// Create a client with default transport and options.
    ///
    /// Fails with [`VcsError::InvalidRepositoryUrl`] unless the URL path is
    /// exactly `workspace/repo`.
    pub fn new(repository_url: &str, credentials: Option<Credentials>) -> Result<Self, VcsError> {
        Self::with_options(repository_url, credentials, ClientOptions::default())
    }

    pub fn with_options(
        repository_url: &str,
        credentials: Option<Credentials>,
        options: ClientOptions,
    ) -> Result<Self, VcsError> {
        let identity = RepositoryIdentity::parse(Provider::Bitbucket, repository_url)?;
        let api_base = options
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let rest = RestClient::new(
            Provider::Bitbucket,
            api_base,
            identity.encoded_segments(),
            AUTH_PARAM,
            credentials,
            &options,
        );

        Ok(Self {
            identity,
            default_branch: options.default_branch,
            rest,
        })
    }

    async fn get_ref(&self, kind: &str, name: &str) -> Result<Option<Reference>, VcsError> {
        let template = format!(
            "/repositories/:namespace/refs/{kind}/{}",
            encode_segment(name)
        );
        let found: Ref = self.rest.get_json(&template, &[]).await?;
        let download_url = self.archive_download_url(&found.name);

        Ok(Some(if kind == "tags" {
            Reference::tag(&found.name, found.updated(), download_url)
        } else {
            Reference::branch(&found.name, found.updated(), download_url)
        }))
    }
}

#[async_trait]
impl VcsApi for BitbucketApi {
    fn provider(&self) -> Provider {
        Provider::Bitbucket
    }

    fn identity(&self) -> &RepositoryIdentity {
        &self.identity
    }

    async fn latest_tag(&self) -> Result<Option<Reference>, VcsError> {
        let page: Page<Ref> = self
            .rest
            .get_json(
                "/repositories/:namespace/refs/tags",
                &[("sort", "-target.date"), ("pagelen", TAGS_PAGE_LEN)],
            )
            .await?;

        let Some(latest) = find_latest_tag(page.values.iter().map(|t| t.name.as_str())) else {
            return Ok(None);
        };
        let updated = page
            .values
            .iter()
            .find(|t| t.name == latest)
            .and_then(Ref::updated);

        Ok(Some(Reference::tag(
            latest,
            updated,
            self.archive_download_url(latest),
        )))
    }

    async fn tag(&self, name: &str) -> Result<Option<Reference>, VcsError> {
        self.get_ref("tags", name).await
    }

    async fn branch(&self, name: &str) -> Result<Option<Reference>, VcsError> {
        self.get_ref("branches", name).await
    }

    async fn latest_commit_time(
        &self,
        reference: &str,
    ) -> Result<Option<DateTime<Utc>>, VcsError> {
        let template = format!("/repositories/:namespace/commits/{}", encode_segment(reference));
        let page: Page<Target> = self.rest.get_json(&template, &[("pagelen", "1")]).await?;

        Ok(page
            .values
            .first()
            .and_then(|c| c.date.as_deref())
            .and_then(parse_timestamp))
    }

    /// The src endpoint serves the raw file, so no decoding is needed.
    async fn remote_file(
        &self,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Option<String>, VcsError> {
        let reference = reference.unwrap_or(&self.default_branch);
        let template = format!(
            "/repositories/:namespace/src/{}/{}",
            encode_segment(reference),
            encode_path(path)
        );

        self.rest.get_text(&template, &[]).await.map(Some)
    }

    fn archive_download_url(&self, reference: &str) -> String {
        let url = format!(
            "{}/{}/get/{}.zip",
            DOWNLOAD_BASE_URL,
            self.identity.encoded_segments(),
            encode_segment(reference)
        );
        self.sign_download_url(&url)
    }

    fn set_authentication(&mut self, credentials: Option<Credentials>) {
        self.rest.set_credentials(credentials);
    }

    fn sign_download_url(&self, url: &str) -> String {
        self.rest.sign(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::{Matcher, Server};

    fn api_for(server: &Server) -> BitbucketApi {
        BitbucketApi::with_options(
            "https://bitbucket.org/team/plugin",
            None,
            ClientOptions {
                api_base: Some(server.url()),
                ..ClientOptions::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn archive_download_url_uses_get_endpoint() {
        let api = BitbucketApi::new("https://bitbucket.org/team/plugin", None).unwrap();

        assert_eq!(
            api.archive_download_url("1.2.3"),
            "https://bitbucket.org/team/plugin/get/1.2.3.zip"
        );
    }

    #[test]
    fn sign_download_url_appends_token_each_time_it_is_called() {
        let api =
            BitbucketApi::new("https://bitbucket.org/team/plugin", Some(Credentials::new("t")))
                .unwrap();

        let signed = api.archive_download_url("main");
        assert_eq!(signed.matches("access_token=t").count(), 1);

        let resigned = api.sign_download_url(&signed);
        assert_eq!(resigned.matches("access_token=t").count(), 2);
    }

    #[tokio::test]
    async fn latest_tag_reads_first_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repositories/team/plugin/refs/tags")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sort".into(), "-target.date".into()),
                Matcher::UrlEncoded("pagelen".into(), "100".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"values": [
                    {"name": "1.9", "target": {"date": "2024-01-01T00:00:00+00:00"}},
                    {"name": "1.10", "target": {"date": "2023-01-01T00:00:00+00:00"}},
                    {"name": "wip", "target": {"date": "2024-06-01T00:00:00+00:00"}}
                ]}"#,
            )
            .create_async()
            .await;

        let api = api_for(&server);
        let reference = api.latest_tag().await.unwrap().unwrap();

        mock.assert_async().await;
        assert_eq!(reference.name, "1.10");
        assert_eq!(
            reference.updated,
            Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn tag_reads_target_date() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repositories/team/plugin/refs/tags/v3.1")
            .with_status(200)
            .with_body(r#"{"name": "v3.1", "target": {"date": "2024-03-03T03:03:03+00:00"}}"#)
            .create_async()
            .await;

        let api = api_for(&server);
        let reference = api.tag("v3.1").await.unwrap().unwrap();

        mock.assert_async().await;
        assert_eq!(reference.version.as_deref(), Some("3.1"));
        assert_eq!(
            reference.download_url,
            "https://bitbucket.org/team/plugin/get/v3.1.zip"
        );
    }

    #[tokio::test]
    async fn branch_has_no_version() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repositories/team/plugin/refs/branches/develop")
            .with_status(200)
            .with_body(r#"{"name": "develop", "target": {"date": "2024-03-03T03:03:03+00:00"}}"#)
            .create_async()
            .await;

        let api = api_for(&server);
        let reference = api.branch("develop").await.unwrap().unwrap();

        mock.assert_async().await;
        assert_eq!(reference.version, None);
    }

    #[tokio::test]
    async fn latest_commit_time_reads_first_commit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repositories/team/plugin/commits/main")
            .match_query(Matcher::UrlEncoded("pagelen".into(), "1".into()))
            .with_status(200)
            .with_body(r#"{"values": [{"date": "2024-08-08T08:08:08+00:00"}]}"#)
            .create_async()
            .await;

        let api = api_for(&server);
        let time = api.latest_commit_time("main").await.unwrap();

        mock.assert_async().await;
        assert_eq!(time, Some(Utc.with_ymd_and_hms(2024, 8, 8, 8, 8, 8).unwrap()));
    }

    #[tokio::test]
    async fn remote_file_returns_raw_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repositories/team/plugin/src/master/readme.txt")
            .with_status(200)
            .with_body("=== Plugin ===\nStable tag: 2.0\n")
            .create_async()
            .await;

        let api = api_for(&server);
        let content = api.remote_file("readme.txt", None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(content.as_deref(), Some("=== Plugin ===\nStable tag: 2.0\n"));
    }

    #[tokio::test]
    async fn remote_file_encodes_path_segments() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repositories/team/plugin/src/master/docs/read%20me%231.txt")
            .with_status(200)
            .with_body("Stable tag: 1.0\n")
            .create_async()
            .await;

        let api = api_for(&server);
        let content = api.remote_file("docs/read me#1.txt", None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(content.as_deref(), Some("Stable tag: 1.0\n"));
    }
}

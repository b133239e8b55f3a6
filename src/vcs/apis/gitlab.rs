//! GitLab REST API (v4) client
//!
//! Works against gitlab.com and self-hosted instances: the API host is taken
//! from the repository URL. Group paths may be nested (`group/sub/project`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::vcs::api::VcsApi;
use crate::vcs::error::VcsError;
use crate::vcs::identity::RepositoryIdentity;
use crate::vcs::rest::{
    ClientOptions, RestClient, add_query_args, decode_file_content, encode_segment,
};
use crate::vcs::types::{Credentials, Provider, Reference, parse_timestamp};
use crate::vcs::version::find_latest_tag;

/// Host used for short-form repository URLs
const DEFAULT_WEB_BASE: &str = "https://gitlab.com";

const AUTH_PARAM: &str = "private_token";

#[derive(Debug, Deserialize)]
struct Commit {
    committed_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
    commit: Option<Commit>,
}

#[derive(Debug, Deserialize)]
struct Branch {
    name: String,
    commit: Option<Commit>,
}

#[derive(Debug, Deserialize)]
struct RepositoryFile {
    content: Option<String>,
    encoding: Option<String>,
}

fn committed_at(commit: Option<&Commit>) -> Option<DateTime<Utc>> {
    commit
        .and_then(|c| c.committed_date.as_deref())
        .and_then(parse_timestamp)
}

/// Scheme, host and port of a full repository URL
fn web_base(repository_url: &str) -> String {
    match url::Url::parse(repository_url) {
        Ok(parsed) if parsed.has_host() => parsed.origin().ascii_serialization(),
        _ => DEFAULT_WEB_BASE.to_string(),
    }
}

/// Client for a single GitLab project
pub struct GitLabApi {
    identity: RepositoryIdentity,
    web_base: String,
    default_branch: String,
    rest: RestClient,
}

impl GitLabApi {
    /// Create a client with default transport and options.
    ///
    /// Fails with [`VcsError::InvalidRepositoryUrl`] when no `group/project`
    /// path can be extracted from `repository_url`.
    pub fn new(repository_url: &str, credentials: Option<Credentials>) -> Result<Self, VcsError> {
        Self::with_options(repository_url, credentials, ClientOptions::default())
    }

    pub fn with_options(
        repository_url: &str,
        credentials: Option<Credentials>,
        options: ClientOptions,
    ) -> Result<Self, VcsError> {
        let identity = RepositoryIdentity::parse(Provider::GitLab, repository_url)?;
        let web_base = web_base(repository_url);
        let api_base = options
            .api_base
            .clone()
            .unwrap_or_else(|| format!("{web_base}/api/v4"));

        let rest = RestClient::new(
            Provider::GitLab,
            api_base,
            identity.encoded(),
            AUTH_PARAM,
            credentials,
            &options,
        );

        Ok(Self {
            identity,
            web_base,
            default_branch: options.default_branch,
            rest,
        })
    }
}

#[async_trait]
impl VcsApi for GitLabApi {
    fn provider(&self) -> Provider {
        Provider::GitLab
    }

    fn identity(&self) -> &RepositoryIdentity {
        &self.identity
    }

    async fn latest_tag(&self) -> Result<Option<Reference>, VcsError> {
        let tags: Vec<Tag> = self
            .rest
            .get_json("/projects/:namespace/repository/tags", &[])
            .await?;

        let Some(latest) = find_latest_tag(tags.iter().map(|t| t.name.as_str())) else {
            return Ok(None);
        };
        let updated = tags
            .iter()
            .find(|t| t.name == latest)
            .and_then(|t| committed_at(t.commit.as_ref()));

        Ok(Some(Reference::tag(
            latest,
            updated,
            self.archive_download_url(latest),
        )))
    }

    async fn tag(&self, name: &str) -> Result<Option<Reference>, VcsError> {
        let template = format!(
            "/projects/:namespace/repository/tags/{}",
            encode_segment(name)
        );
        let tag: Tag = self.rest.get_json(&template, &[]).await?;

        Ok(Some(Reference::tag(
            &tag.name,
            committed_at(tag.commit.as_ref()),
            self.archive_download_url(&tag.name),
        )))
    }

    async fn branch(&self, name: &str) -> Result<Option<Reference>, VcsError> {
        let template = format!(
            "/projects/:namespace/repository/branches/{}",
            encode_segment(name)
        );
        let branch: Branch = self.rest.get_json(&template, &[]).await?;

        Ok(Some(Reference::branch(
            &branch.name,
            committed_at(branch.commit.as_ref()),
            self.archive_download_url(&branch.name),
        )))
    }

    async fn latest_commit_time(
        &self,
        reference: &str,
    ) -> Result<Option<DateTime<Utc>>, VcsError> {
        let commits: Vec<Commit> = self
            .rest
            .get_json(
                "/projects/:namespace/repository/commits",
                &[("ref_name", reference)],
            )
            .await?;

        Ok(committed_at(commits.first()))
    }

    async fn remote_file(
        &self,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Option<String>, VcsError> {
        let reference = reference.unwrap_or(&self.default_branch);
        let template = format!(
            "/projects/:namespace/repository/files/{}",
            encode_segment(path)
        );
        let file: RepositoryFile = self.rest.get_json(&template, &[("ref", reference)]).await?;

        match (file.content, file.encoding) {
            (Some(content), Some(encoding)) => decode_file_content(&content, &encoding).map(Some),
            _ => Err(VcsError::MalformedResponse(format!(
                "File response for {path} has no content"
            ))),
        }
    }

    fn archive_download_url(&self, reference: &str) -> String {
        let url = add_query_args(
            &format!(
                "{}/{}/repository/archive.zip",
                self.web_base,
                self.identity.encoded_segments()
            ),
            &[("ref", reference)],
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

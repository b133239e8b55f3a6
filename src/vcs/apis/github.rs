//! GitHub REST API client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::vcs::api::{Operation, VcsApi, unsupported};
use crate::vcs::error::VcsError;
use crate::vcs::identity::RepositoryIdentity;
use crate::vcs::rest::{
    ClientOptions, RestClient, decode_file_content, encode_path, encode_segment,
};
use crate::vcs::types::{Credentials, Provider, Reference, parse_timestamp};
use crate::vcs::version::find_latest_tag;

/// Default base URL for GitHub API
const DEFAULT_BASE_URL: &str = "https://api.github.com";

const AUTH_PARAM: &str = "access_token";

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Commit {
    commit: Option<CommitDetail>,
}

impl Commit {
    fn authored_at(&self) -> Option<DateTime<Utc>> {
        self.commit
            .as_ref()
            .and_then(|c| c.author.as_ref())
            .and_then(|a| a.date.as_deref())
            .and_then(parse_timestamp)
    }
}

#[derive(Debug, Deserialize)]
struct Branch {
    name: String,
    commit: Option<Commit>,
}

#[derive(Debug, Deserialize)]
struct Contents {
    content: Option<String>,
    encoding: Option<String>,
}

/// Client for a single GitHub repository
pub struct GitHubApi {
    identity: RepositoryIdentity,
    default_branch: String,
    rest: RestClient,
}

impl GitHubApi {
    /// Create a client with default transport and options.
    ///
    /// Fails with [`VcsError::InvalidRepositoryUrl`] unless the URL path is
    /// exactly `owner/repo`.
    pub fn new(repository_url: &str, credentials: Option<Credentials>) -> Result<Self, VcsError> {
        Self::with_options(repository_url, credentials, ClientOptions::default())
    }

    pub fn with_options(
        repository_url: &str,
        credentials: Option<Credentials>,
        mut options: ClientOptions,
    ) -> Result<Self, VcsError> {
        let identity = RepositoryIdentity::parse(Provider::GitHub, repository_url)?;
        let api_base = options
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        options.request.headers.push((
            "Accept".to_string(),
            "application/vnd.github+json".to_string(),
        ));

        let rest = RestClient::new(
            Provider::GitHub,
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
}

#[async_trait]
impl VcsApi for GitHubApi {
    fn provider(&self) -> Provider {
        Provider::GitHub
    }

    fn identity(&self) -> &RepositoryIdentity {
        &self.identity
    }

    fn supports(&self, operation: Operation) -> bool {
        operation != Operation::Tag
    }

    async fn latest_tag(&self) -> Result<Option<Reference>, VcsError> {
        let tags: Vec<Tag> = self.rest.get_json("/repos/:namespace/tags", &[]).await?;

        Ok(find_latest_tag(tags.iter().map(|t| t.name.as_str()))
            .map(|latest| Reference::tag(latest, None, self.archive_download_url(latest))))
    }

    /// The tags endpoint carries no commit dates and there is no cheap
    /// single-tag lookup, so this is not implemented for GitHub.
    async fn tag(&self, _name: &str) -> Result<Option<Reference>, VcsError> {
        Err(unsupported(Provider::GitHub, Operation::Tag))
    }

    async fn branch(&self, name: &str) -> Result<Option<Reference>, VcsError> {
        let template = format!("/repos/:namespace/branches/{}", encode_segment(name));
        let branch: Branch = self.rest.get_json(&template, &[]).await?;

        Ok(Some(Reference::branch(
            &branch.name,
            branch.commit.as_ref().and_then(Commit::authored_at),
            self.archive_download_url(&branch.name),
        )))
    }

    async fn latest_commit_time(
        &self,
        reference: &str,
    ) -> Result<Option<DateTime<Utc>>, VcsError> {
        let commits: Vec<Commit> = self
            .rest
            .get_json("/repos/:namespace/commits", &[("sha", reference)])
            .await?;

        Ok(commits.first().and_then(Commit::authored_at))
    }

    async fn remote_file(
        &self,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Option<String>, VcsError> {
        let reference = reference.unwrap_or(&self.default_branch);
        let template = format!("/repos/:namespace/contents/{}", encode_path(path));
        let contents: Contents = self.rest.get_json(&template, &[("ref", reference)]).await?;

        match (contents.content, contents.encoding) {
            (Some(content), Some(encoding)) => decode_file_content(&content, &encoding).map(Some),
            _ => Err(VcsError::MalformedResponse(format!(
                "Contents response for {path} has no content"
            ))),
        }
    }

    fn archive_download_url(&self, reference: &str) -> String {
        let url = format!(
            "{}/repos/{}/zipball/{}",
            DEFAULT_BASE_URL,
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

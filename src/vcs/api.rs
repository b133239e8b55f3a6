//! Provider-independent VCS client interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::vcs::error::VcsError;
use crate::vcs::identity::RepositoryIdentity;
use crate::vcs::types::{Credentials, Provider, Reference};

/// Operations a client may or may not implement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LatestTag,
    Tag,
    Branch,
    LatestCommitTime,
    RemoteFile,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::LatestTag => "latest_tag",
            Operation::Tag => "tag",
            Operation::Branch => "branch",
            Operation::LatestCommitTime => "latest_commit_time",
            Operation::RemoteFile => "remote_file",
        }
    }
}

/// Uniform access to a repository on one hosting provider.
///
/// Read operations return `Ok(None)` when the provider answered but has
/// nothing matching, and `Err` when the request itself failed. Callers that
/// only care about "found or not" treat both the same way.
#[async_trait]
pub trait VcsApi: Send + Sync {
    /// The provider this client talks to
    fn provider(&self) -> Provider;

    /// The repository this client was constructed for
    fn identity(&self) -> &RepositoryIdentity;

    /// Whether `operation` is implemented by this client
    fn supports(&self, operation: Operation) -> bool {
        let _ = operation;
        true
    }

    /// The tag that looks like the highest version number
    async fn latest_tag(&self) -> Result<Option<Reference>, VcsError>;

    /// A specific tag by name
    async fn tag(&self, name: &str) -> Result<Option<Reference>, VcsError>;

    /// A branch head by name
    async fn branch(&self, name: &str) -> Result<Option<Reference>, VcsError>;

    /// Time of the most recent commit reachable from `reference`
    async fn latest_commit_time(&self, reference: &str)
    -> Result<Option<DateTime<Utc>>, VcsError>;

    /// Contents of a file at `reference`, or at the default branch when `None`
    async fn remote_file(
        &self,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Option<String>, VcsError>;

    /// URL of a ZIP archive of the repository at `reference`, signed when credentials are set
    fn archive_download_url(&self, reference: &str) -> String;

    /// Replace the stored credentials; affects every later call
    fn set_authentication(&mut self, credentials: Option<Credentials>);

    /// Append the auth parameter to `url`; returns it unchanged without credentials
    fn sign_download_url(&self, url: &str) -> String;
}

/// Error for operations a client does not implement
pub(crate) fn unsupported(provider: Provider, operation: Operation) -> VcsError {
    VcsError::Unsupported {
        provider,
        operation: operation.as_str(),
    }
}

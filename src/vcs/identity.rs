//! Repository identity extraction from repository URLs
//!
//! Accepts full URLs (`https://gitlab.com/group/sub/project`) as well as
//! short forms (`user/repo`). Only the path is considered; scheme, host,
//! query and fragment are ignored.

use std::sync::LazyLock;

use regex::Regex;

use crate::vcs::error::VcsError;
use crate::vcs::types::Provider;

/// `owner/repo` with exactly one owner segment (GitHub, Bitbucket)
static SINGLE_OWNER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/?(?P<owner>[^/#?&]+?)/(?P<repo>[^/#?&]+?)/?$").expect("valid regex")
});

/// `group/sub/.../repo` with nested groups (GitLab)
static NESTED_GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/?(?P<owner>[^/#?&]+(?:/[^/#?&]+)*?)/(?P<repo>[^/#?&]+?)/?$")
        .expect("valid regex")
});

/// Provider-specific path uniquely identifying a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIdentity {
    namespace: String,
}

impl RepositoryIdentity {
    /// Parse the repository path out of `repository_url` using the grammar of `provider`.
    pub fn parse(provider: Provider, repository_url: &str) -> Result<Self, VcsError> {
        let path = url_path(repository_url);
        let re = match provider {
            Provider::GitLab => &*NESTED_GROUP_RE,
            Provider::GitHub | Provider::Bitbucket => &*SINGLE_OWNER_RE,
        };

        let captures = re
            .captures(&path)
            .ok_or_else(|| VcsError::InvalidRepositoryUrl {
                provider,
                url: repository_url.to_string(),
            })?;

        let repo = &captures["repo"];
        let repo = repo
            .strip_suffix(".git")
            .filter(|stripped| !stripped.is_empty())
            .unwrap_or(repo);

        Ok(Self {
            namespace: format!("{}/{}", &captures["owner"], repo),
        })
    }

    /// The `owner/repo` (or `group/sub/repo`) path
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Namespace as a single URL path segment (`group%2Fproject`)
    pub fn encoded(&self) -> String {
        urlencoding::encode(&self.namespace).into_owned()
    }

    /// Namespace with each segment encoded but the separators kept
    pub fn encoded_segments(&self) -> String {
        self.namespace
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// The path component of a URL, or the input itself when it has no scheme.
fn url_path(repository_url: &str) -> String {
    match url::Url::parse(repository_url) {
        Ok(parsed) if parsed.has_host() => parsed.path().to_string(),
        _ => repository_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

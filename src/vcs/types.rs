//! Common types shared by the provider clients and the resolver

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Hosting provider of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// github.com
    GitHub,
    /// gitlab.com or a self-hosted GitLab instance
    GitLab,
    /// bitbucket.org
    Bitbucket,
}

impl Provider {
    /// Returns the string representation of the provider
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::GitLab => "gitlab",
            Provider::Bitbucket => "bitbucket",
        }
    }

    /// Guess the provider from the host of a repository URL.
    ///
    /// Short forms such as `user/repo` carry no host and yield `None`.
    pub fn detect(repository_url: &str) -> Option<Provider> {
        let parsed = url::Url::parse(repository_url).ok()?;
        let host = parsed.host_str()?.to_ascii_lowercase();

        if host == "github.com" || host.ends_with(".github.com") {
            Some(Provider::GitHub)
        } else if host == "bitbucket.org" || host.ends_with(".bitbucket.org") {
            Some(Provider::Bitbucket)
        } else if host.contains("gitlab") {
            Some(Provider::GitLab)
        } else {
            None
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::GitHub => "GitHub",
            Provider::GitLab => "GitLab",
            Provider::Bitbucket => "Bitbucket",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Provider::GitHub),
            "gitlab" => Ok(Provider::GitLab),
            "bitbucket" => Ok(Provider::Bitbucket),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Access token for a private repository.
///
/// The token never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials(String);

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(***)")
    }
}

/// A resolved pointer to a tag or branch usable as an update source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Tag or branch name
    pub name: String,
    /// Tag name without its leading `v`; `None` for branches
    pub version: Option<String>,
    /// Time of the last commit on this ref, when known
    pub updated: Option<DateTime<Utc>>,
    /// Archive of the code at this ref, already signed when credentials are set
    pub download_url: String,
}

impl Reference {
    /// Reference for a tag; the version is derived from the tag name
    pub fn tag(name: &str, updated: Option<DateTime<Utc>>, download_url: String) -> Self {
        Self {
            name: name.to_string(),
            version: Some(name.trim_start_matches('v').to_string()),
            updated,
            download_url,
        }
    }

    /// Reference for a branch head
    pub fn branch(name: &str, updated: Option<DateTime<Utc>>, download_url: String) -> Self {
        Self {
            name: name.to_string(),
            version: None,
            updated,
            download_url,
        }
    }

    /// Copy of this reference with the update time set
    pub fn with_updated(&self, updated: DateTime<Utc>) -> Self {
        Self {
            updated: Some(updated),
            ..self.clone()
        }
    }
}

/// Parse a provider timestamp (RFC 3339) into UTC.
///
/// Unparseable timestamps are dropped rather than failing the whole lookup.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

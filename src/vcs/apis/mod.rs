//! Provider client implementations

pub mod bitbucket;
pub mod github;
pub mod gitlab;

pub use bitbucket::BitbucketApi;
pub use github::GitHubApi;
pub use gitlab::GitLabApi;

use crate::vcs::api::VcsApi;
use crate::vcs::error::VcsError;
use crate::vcs::rest::ClientOptions;
use crate::vcs::types::{Credentials, Provider};

/// Construct the client for `provider`
pub fn create_api(
    provider: Provider,
    repository_url: &str,
    credentials: Option<Credentials>,
    options: ClientOptions,
) -> Result<Box<dyn VcsApi>, VcsError> {
    let api: Box<dyn VcsApi> = match provider {
        Provider::GitHub => Box::new(GitHubApi::with_options(
            repository_url,
            credentials,
            options,
        )?),
        Provider::GitLab => Box::new(GitLabApi::with_options(
            repository_url,
            credentials,
            options,
        )?),
        Provider::Bitbucket => Box::new(BitbucketApi::with_options(
            repository_url,
            credentials,
            options,
        )?),
    };
    Ok(api)
}

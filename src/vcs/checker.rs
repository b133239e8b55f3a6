//! Host-facing entry point: construct a client, resolve the latest reference

use tracing::debug;

use crate::config::CheckerConfig;
use crate::vcs::api::VcsApi;
use crate::vcs::apis::create_api;
use crate::vcs::error::VcsError;
use crate::vcs::resolver::ReferenceResolver;
use crate::vcs::rest::ClientOptions;
use crate::vcs::types::{Credentials, Provider, Reference};

/// Resolves update information for repositories
pub struct UpdateChecker {
    options: ClientOptions,
    resolver: ReferenceResolver,
}

impl UpdateChecker {
    pub fn new(config: &CheckerConfig) -> Self {
        Self {
            options: config.client_options(),
            resolver: ReferenceResolver::new(config.resolver_config()),
        }
    }

    /// Replace the options used for every client this checker constructs
    pub fn with_client_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    /// Construct a client for `repository_url`.
    ///
    /// The provider is detected from the URL host unless given explicitly.
    pub fn client(
        &self,
        repository_url: &str,
        provider: Option<Provider>,
        credentials: Option<Credentials>,
    ) -> Result<Box<dyn VcsApi>, VcsError> {
        let provider = provider
            .or_else(|| Provider::detect(repository_url))
            .ok_or_else(|| VcsError::UnknownProvider(repository_url.to_string()))?;

        create_api(provider, repository_url, credentials, self.options.clone())
    }

    /// Resolve the latest reference of the repository at `repository_url`.
    ///
    /// `Err` means the client could not be constructed; lookups that fail
    /// during resolution only ever lead to `Ok(None)`.
    pub async fn check(
        &self,
        repository_url: &str,
        branch: &str,
        credentials: Option<Credentials>,
    ) -> Result<Option<Reference>, VcsError> {
        let api = self.client(repository_url, None, credentials)?;
        Ok(self.check_api(api.as_ref(), branch).await)
    }

    /// Resolve the latest reference through an existing client.
    ///
    /// When the chosen reference carries no update time, the time of the
    /// latest commit on it is looked up instead.
    pub async fn check_api(&self, api: &dyn VcsApi, branch: &str) -> Option<Reference> {
        let reference = self.resolver.choose_reference(api, branch).await?;
        if reference.updated.is_some() {
            return Some(reference);
        }

        match api.latest_commit_time(&reference.name).await {
            Ok(Some(updated)) => Some(reference.with_updated(updated)),
            Ok(None) => Some(reference),
            Err(e) => {
                debug!("No commit time for {}: {}", reference.name, e);
                Some(reference)
            }
        }
    }
}

impl Default for UpdateChecker {
    fn default() -> Self {
        Self::new(&CheckerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://github.com/user/repo", Provider::GitHub)]
    #[case("https://gitlab.com/group/sub/repo", Provider::GitLab)]
    #[case("https://bitbucket.org/team/repo", Provider::Bitbucket)]
    fn client_detects_provider(#[case] url: &str, #[case] expected: Provider) {
        let checker = UpdateChecker::default();

        let api = checker.client(url, None, None).unwrap();

        assert_eq!(api.provider(), expected);
    }

    #[test]
    fn client_prefers_explicit_provider() {
        let checker = UpdateChecker::default();

        let api = checker
            .client("https://code.example.com/group/repo", Some(Provider::GitLab), None)
            .unwrap();

        assert_eq!(api.provider(), Provider::GitLab);
    }

    #[test]
    fn client_rejects_unknown_host() {
        let checker = UpdateChecker::default();

        let result = checker.client("https://code.example.com/group/repo", None, None);

        assert!(matches!(result, Err(VcsError::UnknownProvider(_))));
    }

    #[tokio::test]
    async fn check_fails_fast_on_invalid_url() {
        let checker = UpdateChecker::default();

        let result = checker.check("https://github.com/only-owner", "master", None).await;

        assert!(matches!(
            result,
            Err(VcsError::InvalidRepositoryUrl {
                provider: Provider::GitHub,
                ..
            })
        ));
    }

    #[test]
    fn new_uses_configured_default_branch() {
        let config = CheckerConfig {
            default_branch: "main".to_string(),
            ..CheckerConfig::default()
        };

        let checker = UpdateChecker::new(&config);

        assert_eq!(checker.resolver().config().default_branch, "main");
    }
}

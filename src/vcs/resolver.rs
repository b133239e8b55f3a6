//! Latest reference resolution
//!
//! Decides which ref represents the latest release, trying in order:
//!
//! 1. the `Stable tag` header of the readme on the configured branch
//! 2. the highest version tag, only when the configured branch is the default branch
//! 3. the configured branch itself
//!
//! Every failed lookup just moves on to the next step. A readme declaring
//! `Stable tag: trunk` (or the branch name) opts the project out of tag-based
//! updates and resolves to the branch head.

use tracing::{debug, error, info, warn};

use crate::config::{DEFAULT_BRANCH, DEFAULT_README, STABLE_TAG_TRUNK};
use crate::vcs::api::{Operation, VcsApi};
use crate::vcs::error::VcsError;
use crate::vcs::readme::parse_stable_tag;
use crate::vcs::types::Reference;

/// Settings for [`ReferenceResolver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Branch against which version tags are scanned
    pub default_branch: String,
    /// Readme file inspected for a `Stable tag` header
    pub readme: String,
    /// Whether the readme is consulted at all
    pub stable_tag: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_branch: DEFAULT_BRANCH.to_string(),
            readme: DEFAULT_README.to_string(),
            stable_tag: true,
        }
    }
}

/// Turn a failed lookup into "nothing found", logging why.
fn absorb<T>(result: Result<Option<T>, VcsError>, lookup: &str) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e @ VcsError::Unsupported { .. }) => {
            error!("Resolver invoked an unsupported operation ({}): {}", lookup, e);
            None
        }
        Err(e) => {
            debug!("{} lookup found nothing: {}", lookup, e);
            None
        }
    }
}

pub struct ReferenceResolver {
    config: ResolverConfig,
}

impl ReferenceResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Figure out which reference (tag or branch) contains the latest version.
    ///
    /// Returns `None` only when the branch fallback fails as well.
    pub async fn choose_reference(
        &self,
        api: &dyn VcsApi,
        config_branch: &str,
    ) -> Option<Reference> {
        if self.config.stable_tag {
            if let Some(reference) = self.stable_tag_reference(api, config_branch).await {
                info!(
                    "{} resolved via stable tag to {}",
                    api.identity().namespace(),
                    reference.name
                );
                return Some(reference);
            }
        }

        if config_branch == self.config.default_branch {
            if let Some(reference) = absorb(api.latest_tag().await, "latest tag") {
                info!(
                    "{} resolved to version tag {}",
                    api.identity().namespace(),
                    reference.name
                );
                return Some(reference);
            }
        }

        let reference = absorb(api.branch(config_branch).await, "branch");
        match &reference {
            Some(r) => info!("{} resolved to branch {}", api.identity().namespace(), r.name),
            None => warn!(
                "No reference found for {} on branch {}",
                api.identity().namespace(),
                config_branch
            ),
        }
        reference
    }

    /// Reference named by the `Stable tag` header of the readme on `branch`
    async fn stable_tag_reference(&self, api: &dyn VcsApi, branch: &str) -> Option<Reference> {
        if !api.supports(Operation::RemoteFile) {
            return None;
        }

        let readme = absorb(
            api.remote_file(&self.config.readme, Some(branch)).await,
            "readme",
        )?;
        let tag = parse_stable_tag(&readme)?;
        debug!("Stable tag header on {}: {}", branch, tag);

        if tag == branch || tag == STABLE_TAG_TRUNK {
            return absorb(api.branch(branch).await, "branch");
        }

        if !api.supports(Operation::Tag) {
            warn!(
                "Stable tag {} ignored: {} does not support tag lookup",
                tag,
                api.provider()
            );
            return None;
        }

        absorb(api.tag(&tag).await, "stable tag")
    }
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

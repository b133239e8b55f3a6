//! Resolve the latest release of a repository hosted on GitHub, GitLab or
//! Bitbucket, for update notifications.
//!
//! ```no_run
//! use vcs_update_check::config::CheckerConfig;
//! use vcs_update_check::vcs::checker::UpdateChecker;
//!
//! # async fn run() -> Result<(), vcs_update_check::vcs::error::VcsError> {
//! let checker = UpdateChecker::new(&CheckerConfig::default());
//! if let Some(reference) = checker
//!     .check("https://gitlab.com/group/project", "master", None)
//!     .await?
//! {
//!     println!("{} -> {}", reference.name, reference.download_url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod vcs;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::vcs::resolver::ResolverConfig;
use crate::vcs::rest::ClientOptions;
use crate::vcs::transport::RequestOptions;

// =============================================================================
// Defaults
// =============================================================================

/// Timeout for a single API request in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Branch scanned for version tags unless configured otherwise
pub const DEFAULT_BRANCH: &str = "master";

/// Readme file carrying the `Stable tag` header
pub const DEFAULT_README: &str = "readme.txt";

/// Stable tag value that opts out of tag-based updates
pub const STABLE_TAG_TRUNK: &str = "trunk";

pub const DEFAULT_USER_AGENT: &str = "vcs-update-check";

/// Update checker configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckerConfig {
    /// The repository's primary development branch
    pub default_branch: String,
    /// Readme file inspected for a `Stable tag` header
    pub readme: String,
    /// Consult the readme's `Stable tag` header
    pub stable_tag: bool,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            default_branch: DEFAULT_BRANCH.to_string(),
            readme: DEFAULT_README.to_string(),
            stable_tag: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Errors raised while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl CheckerConfig {
    /// Load a JSON configuration file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            default_branch: self.default_branch.clone(),
            readme: self.readme.clone(),
            stable_tag: self.stable_tag,
        }
    }

    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
            headers: Vec::new(),
        }
    }

    /// Client options carrying this configuration, with the default transport
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            request: self.request_options(),
            default_branch: self.default_branch.clone(),
            ..ClientOptions::default()
        }
    }
}

/// Returns the path to the data directory for vcs-update-check.
/// Uses $XDG_DATA_HOME/vcs-update-check if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/vcs-update-check,
/// or ./vcs-update-check if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("vcs-update-check.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("vcs-update-check")
}

use thiserror::Error;

use crate::vcs::types::Provider;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Transport failure: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("Invalid {provider} repository URL: \"{url}\"")]
    InvalidRepositoryUrl { provider: Provider, url: String },

    #[error("Cannot tell the hosting provider of \"{0}\"")]
    UnknownProvider(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{provider} API error. HTTP status: {status}")]
    ApiHttp { provider: Provider, status: u16 },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("{operation} is not supported by the {provider} client")]
    Unsupported {
        provider: Provider,
        operation: &'static str,
    },
}

//! HTTP transport used by the provider clients
//!
//! The clients only ever issue GET requests and need the status code and the
//! body. Hosts may plug in their own transport or adjust per-request options
//! through a [`RequestFilter`].

use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::vcs::error::TransportError;

/// Options applied to a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub timeout: Duration,
    pub user_agent: String,
    /// Extra headers sent with the request
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
        }
    }
}

/// Host hook rewriting request options right before dispatch
pub type RequestFilter = Arc<dyn Fn(RequestOptions) -> RequestOptions + Send + Sync>;

/// Status code and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Performs the actual network request
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request and wait for the complete response.
    ///
    /// Non-2xx statuses are not errors at this level; only failures to get a
    /// response at all are.
    async fn get(&self, url: &str, options: &RequestOptions)
    -> Result<HttpResponse, TransportError>;
}

/// Transport backed by `reqwest`
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self
            .client
            .get(url)
            .timeout(options.timeout)
            .header(reqwest::header::USER_AGENT, &options.user_agent);

        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}

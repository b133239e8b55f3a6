//! Request plumbing shared by the provider clients
//!
//! Expands endpoint templates, attaches credentials, dispatches through the
//! transport and maps the outcome onto [`VcsError`].

use std::sync::Arc;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::DEFAULT_BRANCH;
use crate::vcs::error::VcsError;
use crate::vcs::transport::{
    HttpTransport, RequestFilter, RequestOptions, ReqwestTransport,
};
use crate::vcs::types::{Credentials, Provider};

/// Construction options common to every provider client
#[derive(Clone)]
pub struct ClientOptions {
    pub transport: Arc<dyn HttpTransport>,
    pub request: RequestOptions,
    pub filter: Option<RequestFilter>,
    /// Branch used when a file is requested without a ref
    pub default_branch: String,
    /// Replaces the provider's API base URL (self-hosted instances, tests)
    pub api_base: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            transport: Arc::new(ReqwestTransport::default()),
            request: RequestOptions::default(),
            filter: None,
            default_branch: DEFAULT_BRANCH.to_string(),
            api_base: None,
        }
    }
}

/// Append query parameters to a URL, keeping any query it already has.
pub(crate) fn add_query_args(url: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

/// Encode a single path segment (ref names may contain `/`)
pub(crate) fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Decode a base64 file payload as returned by the GitHub and GitLab file APIs.
///
/// Any other encoding is rejected.
pub(crate) fn decode_file_content(content: &str, encoding: &str) -> Result<String, VcsError> {
    if encoding != "base64" {
        return Err(VcsError::MalformedResponse(format!(
            "Unexpected encoding: {encoding}"
        )));
    }

    let compact: String = content.split_whitespace().collect();
    let decoded = BASE64_STANDARD
        .decode(compact)
        .map_err(|e| VcsError::MalformedResponse(format!("Failed to decode base64 content: {e}")))?;

    String::from_utf8(decoded)
        .map_err(|e| VcsError::MalformedResponse(format!("Invalid UTF-8 in file content: {e}")))
}

/// An empty token authenticates nothing and counts as no credentials
fn present(credentials: Option<Credentials>) -> Option<Credentials> {
    credentials.filter(|c| !c.token().is_empty())
}

/// Encode each segment of a file path, keeping the `/` separators
pub(crate) fn encode_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

pub(crate) struct RestClient {
    provider: Provider,
    api_base: String,
    /// Value substituted for `:namespace`, already encoded for the provider
    namespace: String,
    auth_param: &'static str,
    credentials: Option<Credentials>,
    transport: Arc<dyn HttpTransport>,
    options: RequestOptions,
    filter: Option<RequestFilter>,
}

impl RestClient {
    pub(crate) fn new(
        provider: Provider,
        api_base: String,
        namespace: String,
        auth_param: &'static str,
        credentials: Option<Credentials>,
        options: &ClientOptions,
    ) -> Self {
        Self {
            provider,
            api_base: api_base.trim_end_matches('/').to_string(),
            namespace,
            auth_param,
            credentials: present(credentials),
            transport: Arc::clone(&options.transport),
            options: options.request.clone(),
            filter: options.filter.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn api_base(&self) -> &str {
        &self.api_base
    }

    pub(crate) fn set_credentials(&mut self, credentials: Option<Credentials>) {
        self.credentials = present(credentials);
    }

    /// Append the auth parameter to `url` when credentials are set
    pub(crate) fn sign(&self, url: &str) -> String {
        match &self.credentials {
            Some(credentials) => add_query_args(url, &[(self.auth_param, credentials.token())]),
            None => url.to_string(),
        }
    }

    fn endpoint(&self, template: &str, query: &[(&str, &str)]) -> String {
        let path = template.replace(":namespace", &self.namespace);
        let mut params = query.to_vec();
        if let Some(credentials) = &self.credentials {
            params.push((self.auth_param, credentials.token()));
        }
        add_query_args(&format!("{}{}", self.api_base, path), &params)
    }

    /// Fetch an endpoint and return the raw body of a 200 response
    pub(crate) async fn get_text(
        &self,
        template: &str,
        query: &[(&str, &str)],
    ) -> Result<String, VcsError> {
        let url = self.endpoint(template, query);
        let options = match &self.filter {
            Some(filter) => filter(self.options.clone()),
            None => self.options.clone(),
        };

        debug!("{} API request: {} {:?}", self.provider, template, query);

        let response = self.transport.get(&url, &options).await.inspect_err(|e| {
            warn!("{} API request failed for {}: {}", self.provider, template, e)
        })?;

        if response.status != 200 {
            warn!(
                "{} API returned status {} for {}",
                self.provider, response.status, template
            );
            return Err(VcsError::ApiHttp {
                provider: self.provider,
                status: response.status,
            });
        }

        Ok(response.body)
    }

    /// Fetch an endpoint and deserialize its JSON body
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        template: &str,
        query: &[(&str, &str)],
    ) -> Result<T, VcsError> {
        let body = self.get_text(template, query).await?;

        serde_json::from_str(&body).map_err(|e| {
            warn!(
                "Failed to parse {} response for {}: {}",
                self.provider, template, e
            );
            VcsError::MalformedResponse(e.to_string())
        })
    }
}

// crates/network/src/client.rs
//! HTTP client wrapper

use crate::error::{NetworkError, NetworkResult};
use reqwest::{Client as ReqwestClient, Response, Url};
use serde::Serialize;
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Maximum redirects to follow
    pub max_redirects: usize,
}

impl ClientConfig {
    /// Default configuration with a different timeout
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("castrelay/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

/// HTTP client
///
/// Every request is attempted once. Non-2xx responses become
/// [`NetworkError::Status`].
#[derive(Clone)]
pub struct Client {
    inner: ReqwestClient,
    config: ClientConfig,
}

impl Client {
    /// Creates a new client with default configuration
    pub fn new() -> NetworkResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> NetworkResult<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(NetworkError::Http)?;

        Ok(Self {
            inner: client,
            config,
        })
    }

    /// Returns the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Performs a GET request
    pub async fn get(&self, url: &str) -> NetworkResult<Response> {
        let url = parse_url(url)?;
        log::debug!("GET {}", url);
        let response = self.inner.get(url.clone()).send().await?;
        check_status(url.as_str(), response)
    }

    /// Performs a GET request and returns the body as text
    pub async fn get_text(&self, url: &str) -> NetworkResult<String> {
        let response = self.get(url).await?;
        Ok(response.text().await?)
    }

    /// POSTs `body` as JSON
    pub async fn post_json<T>(&self, url: &str, body: &T) -> NetworkResult<Response>
    where
        T: Serialize + ?Sized,
    {
        let url = parse_url(url)?;
        log::debug!("POST {}", url);
        let response = self.inner.post(url.clone()).json(body).send().await?;
        check_status(url.as_str(), response)
    }
}

/// Parses an absolute `http(s)` URL
pub(crate) fn parse_url(url: &str) -> NetworkResult<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| NetworkError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(NetworkError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            url, other
        ))),
    }
}

fn check_status(url: &str, response: Response) -> NetworkResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        log::warn!(
            "{} answered {} {}",
            url,
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        );
        Err(NetworkError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

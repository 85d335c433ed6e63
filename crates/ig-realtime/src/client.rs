//! HTTP client bound to the real-time subscriptions endpoint

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::ResponseInfo;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Response bodies that carry transport metadata alongside the parsed JSON
pub trait ApiResponse: DeserializeOwned {
    fn attach_info(&mut self, info: ResponseInfo);
}

/// One request against the base address: a method plus ordered parameters.
///
/// POST parameters travel as a form-encoded body, every other method sends
/// them in the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    method: Method,
    params: Vec<(&'static str, String)>,
}

impl ApiRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            params: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Append a parameter
    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// First value of the named parameter
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether parameters are sent as a form body rather than a query string
    pub fn is_form(&self) -> bool {
        self.method == Method::POST
    }
}

/// Low-level client for the subscriptions endpoint
///
/// Owns a single `reqwest::Client` for its whole lifetime. Requests are sent
/// once; there is no retry.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the endpoint named in `config.realtime_api`
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.realtime_api).map_err(|e| {
            Error::Config(format!(
                "invalid realtime_api URL {:?}: {}",
                config.realtime_api, e
            ))
        })?;

        let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the underlying HTTP client
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Turn an [`ApiRequest`] into a transport request against the base URL
    pub fn build(&self, request: &ApiRequest) -> Result<reqwest::Request> {
        let builder = self
            .http_client
            .request(request.method.clone(), self.base_url.clone());

        let builder = if request.is_form() {
            builder.form(&request.params)
        } else {
            builder.query(&request.params)
        };

        Ok(builder.build()?)
    }

    /// Send a request and parse the response body together with its metadata
    pub async fn execute<T>(&self, request: ApiRequest) -> Result<T>
    where
        T: ApiResponse,
    {
        let method = request.method.clone();
        let request = self.build(&request)?;

        // The full URL carries credentials in the query string
        debug!(%method, url = %self.base_url, "Sending subscriptions request");

        let response = self.http_client.execute(request).await?;
        let status = response.status();
        let info = ResponseInfo::from_parts(status, response.headers());

        debug!(
            %method,
            status = status.as_u16(),
            rate_limit_remaining = ?info.rate_limit_remaining,
            "Received subscriptions response"
        );

        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await?;
            return Err(Error::from_response(status, retry_after, body));
        }

        let bytes = response.bytes().await?;
        let mut body: T = serde_json::from_slice(&bytes)?;
        body.attach_info(info);
        Ok(body)
    }
}

/// Delay named by a `Retry-After` header given in seconds
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .map(Duration::from_secs)
}

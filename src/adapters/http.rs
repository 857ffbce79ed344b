//! Shared blocking HTTP client for provider adapters.
//!
//! Every request carries the client's fixed timeout. A timeout is a terminal
//! failure for that call only; there are no retries.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ports::ProviderError;

const USER_AGENT: &str = concat!("atmosguard/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper over `reqwest::blocking::Client` with error mapping.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Build a client with the given per-request timeout.
    ///
    /// # Errors
    /// Returns error if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` with query parameters and decode a JSON body.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status or undecodable body.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let mut request = self.client.get(url).query(query);
        for (name, value) in headers {
            request = request.header(*name, value);
        }
        let response = request.send().map_err(|e| self.map_error(&e))?;
        self.decode(response)
    }

    /// POST a JSON body to `url` and decode a JSON response.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status or undecodable body.
    pub fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        headers: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let response = self.post(url, body, headers)?;
        self.decode(response)
    }

    /// POST a JSON body and return the raw response after a status check.
    ///
    /// # Errors
    /// Returns error on transport failure or non-2xx status.
    pub fn post<B: Serialize>(
        &self,
        url: &str,
        body: &B,
        headers: &[(&str, String)],
    ) -> Result<reqwest::blocking::Response, ProviderError> {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, value);
        }
        let response = request.send().map_err(|e| self.map_error(&e))?;
        check_status(response)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        response: reqwest::blocking::Response,
    ) -> Result<T, ProviderError> {
        let response = check_status(response)?;
        let bytes = response.bytes().map_err(|e| self.map_error(&e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Map a transport error, distinguishing timeouts.
    #[must_use]
    pub fn map_error(&self, e: &reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(self.timeout.as_secs())
        } else {
            ProviderError::Request(e.to_string())
        }
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ProviderError::status(status.as_u16(), &body))
}

/// Read a required API key, treating blank values as unset.
///
/// # Errors
/// Returns `ProviderError::NotConfigured` naming `what` when the key is absent.
pub fn require_key<'a>(key: Option<&'a str>, what: &str) -> Result<&'a str, ProviderError> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ProviderError::NotConfigured(format!("{what} API key is not set")))
}

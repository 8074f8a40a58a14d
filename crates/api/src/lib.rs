//! Workbench API client utilities.
//!
//! This module provides a lightweight client for the Workbench REST API.
//! It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Discovering the base URL and API key from the environment
//! - Validating the base URL for safety
//! - Building requests with a consistent User-Agent and Accept headers
//!
//! The primary entry point is [`WorkbenchClient`]. Workspace operations are
//! exposed through the [`WorkspaceService`] trait so UI code can be exercised
//! against a fake.
//!
//! # Example
//!
//! ```ignore
//! use workbench_api::{ApiConfig, WorkbenchClient, WorkspaceService};
//!
//! async fn create(request: &workbench_types::CreateWorkspaceRequest) -> anyhow::Result<()> {
//!     let client = WorkbenchClient::new(ApiConfig::from_env())?;
//!     let response = client.create_workspace(request).await?;
//!     println!("{response:?}");
//!     Ok(())
//! }
//! ```

mod error;
mod workspaces;

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder, Url, header};
use tracing::debug;

pub use error::ApiError;
pub use workspaces::{CreateWorkspaceResponse, WorkspaceService, interpret_create_response};

/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "WORKBENCH_API_BASE";
/// Environment variable holding the bearer token.
pub const API_KEY_ENV: &str = "WORKBENCH_API_KEY";
/// Base URL used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:6789/api";

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Connection settings for [`WorkbenchClient`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl ApiConfig {
    /// Read `WORKBENCH_API_BASE` and `WORKBENCH_API_KEY`, ignoring blank values.
    pub fn from_env() -> Self {
        let read = |name: &str| env::var(name).ok().filter(|value| !value.trim().is_empty());
        Self {
            base_url: read(API_BASE_ENV),
            api_key: read(API_KEY_ENV),
        }
    }

    /// Fill unset values from `other`.
    pub fn or(self, other: ApiConfig) -> Self {
        Self {
            base_url: self.base_url.or(other.base_url),
            api_key: self.api_key.or(other.api_key),
        }
    }
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for Workbench API access.
///
/// The client pre-configures default headers and builds requests against a
/// validated base URL.
pub struct WorkbenchClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl WorkbenchClient {
    /// Construct a [`WorkbenchClient`] from explicit settings.
    ///
    /// The base URL falls back to [`DEFAULT_API_BASE`]; a trailing slash is
    /// dropped so API-relative paths can be appended directly. Non-localhost
    /// hosts must use HTTPS.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        if let Some(api_key) = config.api_key {
            let authorization_header_value = format!("Bearer {}", api_key.trim());
            default_headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&authorization_header_value).context("invalid API key")?,
            );
        }
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        validate_base_url(&base_url)?;
        Ok(Self {
            base_url,
            http,
            user_agent: format!("workbench-tui/0.1; {}", env::consts::OS),
        })
    }

    /// Construct a client from `WORKBENCH_API_BASE` / `WORKBENCH_API_KEY`.
    pub fn new_from_env() -> Result<Self> {
        Self::new(ApiConfig::from_env())
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    ///
    /// The resulting request includes the configured User-Agent and base
    /// headers, and is resolved relative to `self.base_url`.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid {} URL '{}': {}", API_BASE_ENV, base, e))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| anyhow!("{} must include a host", API_BASE_ENV))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "{} must use https for non-localhost hosts; got '{}://'",
            API_BASE_ENV,
            parsed_base_url.scheme()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_accepts_any_scheme() {
        assert!(validate_base_url("http://localhost:6789/api").is_ok());
        assert!(validate_base_url("http://127.0.0.1:8080").is_ok());
    }

    #[test]
    fn remote_hosts_require_https() {
        assert!(validate_base_url("https://workbench.example.com/api").is_ok());
        let error = validate_base_url("http://workbench.example.com/api").expect_err("plain http rejected");
        assert!(error.to_string().contains("must use https"), "{error}");
    }

    #[test]
    fn malformed_urls_are_rejected() {
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn request_joins_base_and_path_with_headers() {
        let client = WorkbenchClient::new(ApiConfig {
            base_url: Some("http://localhost:6789/api/".into()),
            api_key: Some("secret-token".into()),
        })
        .expect("client builds");
        assert_eq!(client.base_url, "http://localhost:6789/api");

        let request = client
            .request(reqwest::Method::POST, "/workspaces")
            .build()
            .expect("request builds");
        assert_eq!(request.url().as_str(), "http://localhost:6789/api/workspaces");
        assert!(request.headers().contains_key(header::USER_AGENT));
    }

    #[test]
    fn explicit_settings_win_over_fallbacks() {
        let explicit = ApiConfig {
            base_url: Some("https://a.example.com".into()),
            api_key: None,
        };
        let merged = explicit.or(ApiConfig {
            base_url: Some("https://b.example.com".into()),
            api_key: Some("k".into()),
        });
        assert_eq!(merged.base_url.as_deref(), Some("https://a.example.com"));
        assert_eq!(merged.api_key.as_deref(), Some("k"));
    }
}

//! Tailscale API v2 client.
//!
//! Two blocking calls are made per run:
//!
//! - `POST /api/v2/oauth/token` exchanges OAuth client credentials for a
//!   short-lived bearer token.
//! - `GET /api/v2/tailnet/<tailnet>/devices` lists every device in the tailnet.
//!
//! Both fail fast. There is no retry and no pagination.

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;

const USER_AGENT: &str = concat!("tailscale-hosts-sync/", env!("CARGO_PKG_VERSION"));

/// A device record as returned by the device listing.
///
/// Absent fields decode as empty so that incomplete records are skipped by
/// the normalizer instead of failing the whole fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Device {
    /// Provider-assigned FQDN (e.g. `blocky-1.tailnetname.ts.net`).
    #[serde(default)]
    pub name: String,

    /// User-assigned short label.
    #[serde(default)]
    pub hostname: String,

    /// IPv4 and IPv6 addresses in provider order.
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl Device {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        hostname: impl Into<String>,
        addresses: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            hostname: hostname.into(),
            addresses: addresses.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeviceList {
    #[serde(default)]
    devices: Vec<Device>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Blocking client for the Tailscale control-plane API.
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Builds a client for `config.api_url` with `config.timeout` applied to every request.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if the API URL is invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| SyncError::Config(format!("invalid API URL {}: {e}", config.api_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::Config(format!(
                "invalid API URL {}: not a base URL",
                config.api_url
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Exchanges OAuth client credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Auth`] on transport failure, timeout, a non-success
    /// status, or a body without a usable `access_token`.
    pub fn exchange_token(&self, client_id: &str, client_secret: &str) -> Result<String> {
        let url = self.endpoint(&["api", "v2", "oauth", "token"]);

        let response = self
            .client
            .post(url)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .map_err(|e| request_error(&e, SyncError::auth))?;
        let response = check_status(response, SyncError::auth)?;

        let token: TokenResponse = response
            .json()
            .map_err(|e| SyncError::auth(format!("malformed token response: {e}")))?;
        if token.access_token.is_empty() {
            return Err(SyncError::auth("malformed token response: empty access_token"));
        }

        tracing::info!("Obtained Tailscale API access token");
        Ok(token.access_token)
    }

    /// Lists every device in `tailnet`, unfiltered and in API order.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Fetch`] on transport failure, timeout, a non-success
    /// status, or an undecodable body.
    pub fn fetch_devices(&self, token: &str, tailnet: &str) -> Result<Vec<Device>> {
        let url = self.endpoint(&["api", "v2", "tailnet", tailnet, "devices"]);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .map_err(|e| request_error(&e, SyncError::fetch))?;
        let response = check_status(response, SyncError::fetch)?;

        let list: DeviceList = response
            .json()
            .map_err(|e| SyncError::fetch(format!("malformed device list: {e}")))?;

        tracing::info!(tailnet = %tailnet, count = list.devices.len(), "Fetched tailnet devices");
        Ok(list.devices)
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn check_status(response: Response, make: fn(String) -> SyncError) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let body = body.trim();
    Err(if body.is_empty() {
        make(format!("API returned {status}"))
    } else {
        make(format!("API returned {status}: {body}"))
    })
}

fn request_error(err: &reqwest::Error, make: fn(String) -> SyncError) -> SyncError {
    let mut mapped = make(format!("request failed: {err}"));
    if err.is_timeout() {
        if let SyncError::Auth { timed_out, .. } | SyncError::Fetch { timed_out, .. } = &mut mapped
        {
            *timed_out = true;
        }
    }
    mapped
}

//! Device HTTP client
//!
//! Wraps `reqwest::Client` with the device base url, the connect and read
//! timeouts and uri-to-url construction. The read timeout is an idle limit
//! per read, so a stalled device fails fast while large files still stream.
//! Redirects are not followed: the device answers a request for a missing
//! folder with a redirect, which must surface as a status error instead of
//! silently landing on the root listing.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use notevault_device::client::DeviceClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DeviceClient::new("http://192.168.1.105:8089/", Duration::from_secs(1))?;
//! let page = client.get("Note").await?;
//! println!("{} bytes", page.content_length().unwrap_or(0));
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use notevault_core::ports::DeviceError;
use reqwest::{multipart, redirect, Client, Method, RequestBuilder, Response};
use tracing::debug;
use url::Url;

use crate::classify_error;

/// Default connect and read timeout, matching the device's responsiveness on a LAN
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// HTTP client bound to one device
#[derive(Debug, Clone)]
pub struct DeviceClient {
    /// The underlying HTTP client
    client: Client,
    /// Base url, always ending in `/`
    base_url: Url,
}

impl DeviceClient {
    /// Creates a client for the device at `base_url`
    ///
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) url or the
    /// TLS backend cannot be initialised.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("Invalid device url '{base_url}'"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("Device url must be http(s), got '{}'", base_url);
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Returns the base url requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a device-relative uri against the base url
    ///
    /// Each `/`-separated segment is percent-encoded on its own, so names
    /// containing spaces, `#` or `?` stay inside the path.
    pub fn url_for(&self, uri: &str) -> Url {
        let mut url = self.base_url.clone();
        let trimmed = uri.trim_start_matches('/');
        if !trimmed.is_empty() {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().extend(trimmed.split('/'));
            }
        }
        url
    }

    /// Creates a request builder for the given method and device uri
    pub fn request(&self, method: Method, uri: &str) -> RequestBuilder {
        self.client.request(method, self.url_for(uri))
    }

    /// Sends a GET for `uri` and fails on a non-success status
    pub async fn get(&self, uri: &str) -> Result<Response, DeviceError> {
        debug!(uri, "GET");
        let response = self
            .request(Method::GET, uri)
            .send()
            .await
            .map_err(|e| classify_error(e, uri))?;
        check_status(response, uri)
    }

    /// Posts `data` as a multipart form whose single part is named `filename`
    pub async fn post_file(
        &self,
        destination_uri: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<Response, DeviceError> {
        debug!(destination_uri, filename, size = data.len(), "POST multipart");
        let part = multipart::Part::bytes(data).file_name(filename.to_string());
        let form = multipart::Form::new().part(filename.to_string(), part);

        let response = self
            .request(Method::POST, destination_uri)
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify_error(e, destination_uri))?;
        check_status(response, destination_uri)
    }
}

/// Converts any non-2xx response into [`DeviceError::Status`]
fn check_status(response: Response, uri: &str) -> Result<Response, DeviceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        debug!(uri, status = status.as_u16(), "Device returned error status");
        Err(DeviceError::Status {
            uri: uri.to_string(),
            status: status.as_u16(),
        })
    }
}

//! notevault Device - HTTP adapter for the device's browsable file listing
//!
//! Provides an async client for:
//! - Fetching directory listing pages and file contents
//! - Uploading local files into a device folder (multipart form)
//!
//! ## Modules
//!
//! - [`client`] - Thin HTTP client bound to the device base url
//! - [`provider`] - [`IRemoteDevice`](notevault_core::ports::IRemoteDevice) implementation

pub mod client;
pub mod provider;

pub use client::DeviceClient;
pub use provider::HttpRemoteDevice;

use notevault_core::ports::DeviceError;

/// Maps a transport error onto the port-level [`DeviceError`]
///
/// Connect failures and timeouts mean the device is unreachable. A status
/// error carries the code; anything else is an unreadable response.
pub(crate) fn classify_error(err: reqwest::Error, uri: &str) -> DeviceError {
    if err.is_connect() || err.is_timeout() {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| uri.to_string());
        return DeviceError::Unreachable {
            url,
            reason: err.to_string(),
        };
    }

    if let Some(status) = err.status() {
        return DeviceError::Status {
            uri: uri.to_string(),
            status: status.as_u16(),
        };
    }

    DeviceError::InvalidResponse(err.to_string())
}

//! Remote device port (driven/secondary port)
//!
//! This module defines the interface for talking to the note-taking device's
//! browsable HTTP file listing. The engine only needs two capabilities:
//! fetch the content at a uri, and upload a file to a uri.
//!
//! ## Design Notes
//!
//! - Unlike the storage port, errors are classified with [`DeviceError`]:
//!   the engine must tell "device unreachable" (always fatal) apart from
//!   "the device answered with an error status" (an empty directory for
//!   listings, fatal for downloads).
//! - Uris are device-relative and carry no leading `/`.

use thiserror::Error;

// ============================================================================
// FetchResponse
// ============================================================================

/// Body and status of a successful device request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the response, returning the body
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }
}

// ============================================================================
// DeviceError
// ============================================================================

/// Errors returned by [`IRemoteDevice`] implementations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device could not be reached (connect failure or timeout)
    #[error("Unable to reach device at {url}: {reason}")]
    Unreachable {
        /// Full url of the failed request
        url: String,
        /// Transport-level reason
        reason: String,
    },

    /// The device answered with a non-success status
    #[error("Device returned status {status} for {uri:?}")]
    Status {
        /// The requested uri
        uri: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be read
    #[error("Invalid response from device: {0}")]
    InvalidResponse(String),
}

impl DeviceError {
    /// Returns true for connectivity failures, which abort the whole run
    pub fn is_unreachable(&self) -> bool {
        matches!(self, DeviceError::Unreachable { .. })
    }
}

// ============================================================================
// IRemoteDevice trait
// ============================================================================

/// Port trait for device operations
///
/// ## Implementation Notes
///
/// - No automatic retry: a single connect/read timeout surfaces as
///   [`DeviceError::Unreachable`].
/// - `upload` posts a multipart form whose only part is named `filename`.
#[async_trait::async_trait]
pub trait IRemoteDevice: Send + Sync {
    /// Fetches the content at `uri` (a directory listing page or file bytes)
    async fn fetch(&self, uri: &str) -> Result<FetchResponse, DeviceError>;

    /// Uploads `data` as `filename` into the device folder at `destination_uri`
    async fn upload(
        &self,
        destination_uri: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<FetchResponse, DeviceError>;
}

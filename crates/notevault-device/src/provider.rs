//! HttpRemoteDevice - IRemoteDevice implementation over HTTP
//!
//! Wraps the [`DeviceClient`] and reads response bodies into the port-level
//! [`FetchResponse`].

use async_trait::async_trait;
use notevault_core::ports::{DeviceError, FetchResponse, IRemoteDevice};
use reqwest::Response;
use tracing::{debug, instrument};

use crate::client::DeviceClient;

/// Remote device backed by the device's HTTP file listing
#[derive(Debug, Clone)]
pub struct HttpRemoteDevice {
    client: DeviceClient,
}

impl HttpRemoteDevice {
    /// Creates a new `HttpRemoteDevice` wrapping the given [`DeviceClient`]
    pub fn new(client: DeviceClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client
    pub fn client(&self) -> &DeviceClient {
        &self.client
    }
}

/// Reads the whole body, classifying read failures
async fn into_fetch_response(response: Response, uri: &str) -> Result<FetchResponse, DeviceError> {
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .map_err(|e| crate::classify_error(e, uri))?;
    debug!(uri, status, size = body.len(), "Response received");
    Ok(FetchResponse::new(status, body.to_vec()))
}

#[async_trait]
impl IRemoteDevice for HttpRemoteDevice {
    #[instrument(skip(self))]
    async fn fetch(&self, uri: &str) -> Result<FetchResponse, DeviceError> {
        let response = self.client.get(uri).await?;
        into_fetch_response(response, uri).await
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn upload(
        &self,
        destination_uri: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<FetchResponse, DeviceError> {
        let response = self
            .client
            .post_file(destination_uri, filename, data)
            .await?;
        into_fetch_response(response, destination_uri).await
    }
}

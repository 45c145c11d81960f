//! Shared test helpers for device integration tests
//!
//! Each helper mounts the necessary mock endpoints; `setup_device_mock`
//! returns a configured `HttpRemoteDevice` pointing at the mock server.

use std::time::Duration;

use notevault_device::{DeviceClient, HttpRemoteDevice};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Starts a mock server and returns it with a device bound to its uri
pub async fn setup_device_mock() -> (MockServer, HttpRemoteDevice) {
    let server = MockServer::start().await;
    let client = DeviceClient::new(&server.uri(), Duration::from_secs(1))
        .expect("mock server uri is a valid device url");
    (server, HttpRemoteDevice::new(client))
}

/// Renders a listing page the way the device embeds its file list
pub fn listing_page(file_list: serde_json::Value) -> String {
    let json = serde_json::json!({ "deviceName": "mock", "fileList": file_list });
    format!(
        "<html><body><script>\nconst json = '{}'\nconsole.log('json=' + json)\n</script></body></html>",
        json
    )
}

/// Mounts a listing page at `/<folder>`
pub async fn mount_listing(server: &MockServer, folder: &str, file_list: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{folder}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(file_list)))
        .mount(server)
        .await;
}

/// Mounts raw file content at `/<uri>`
pub async fn mount_file(server: &MockServer, uri: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/{uri}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

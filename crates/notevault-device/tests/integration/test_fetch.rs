//! Integration tests for fetching listings and file contents

use notevault_core::ports::{DeviceError, IRemoteDevice};
use notevault_device::{DeviceClient, HttpRemoteDevice};
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

use crate::common;

#[tokio::test]
async fn test_fetch_listing_page_returns_text() {
    let (server, device) = common::setup_device_mock().await;
    common::mount_listing(
        &server,
        "Note",
        serde_json::json!([{
            "uri": "/Note/Journal.note",
            "date": "2024-03-01 10:15",
            "size": 1024,
            "isDirectory": false,
            "name": "Journal.note",
            "extension": "note"
        }]),
    )
    .await;

    let response = device.fetch("Note").await.expect("fetch listing");
    assert_eq!(response.status, 200);
    let text = response.text();
    assert!(text.contains("const json = '"));
    assert!(text.contains("Journal.note"));
}

#[tokio::test]
async fn test_fetch_file_returns_bytes() {
    let (server, device) = common::setup_device_mock().await;
    let content: Vec<u8> = (0..65_536).map(|i| (i % 251) as u8).collect();
    common::mount_file(&server, "Note/Work/Plan.note", &content).await;

    let response = device.fetch("Note/Work/Plan.note").await.expect("fetch file");
    assert_eq!(response.into_bytes(), content);
}

#[tokio::test]
async fn test_fetch_encodes_spaces_in_uri() {
    let (server, device) = common::setup_device_mock().await;
    common::mount_file(&server, "Note/Meeting%20notes.note", b"spaced").await;

    let response = device
        .fetch("Note/Meeting notes.note")
        .await
        .expect("fetch spaced file");
    assert_eq!(response.bytes(), b"spaced");
}

#[tokio::test]
async fn test_fetch_not_found_is_status_error() {
    let (server, device) = common::setup_device_mock().await;
    Mock::given(method("GET"))
        .and(path("/Missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = device.fetch("Missing").await.unwrap_err();
    assert_eq!(
        err,
        DeviceError::Status {
            uri: "Missing".into(),
            status: 404
        }
    );
    assert!(!err.is_unreachable());
}

#[tokio::test]
async fn test_fetch_redirect_is_not_followed() {
    let (server, device) = common::setup_device_mock().await;
    Mock::given(method("GET"))
        .and(path("/EXPORT"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/"))
        .mount(&server)
        .await;

    let err = device.fetch("EXPORT").await.unwrap_err();
    assert!(matches!(err, DeviceError::Status { status: 301, .. }));
}

#[tokio::test]
async fn test_fetch_unreachable_device() {
    // Nothing listens on port 1
    let client = DeviceClient::new("http://127.0.0.1:1/", std::time::Duration::from_secs(1))
        .expect("valid url");
    let device = HttpRemoteDevice::new(client);

    let err = device.fetch("Note").await.unwrap_err();
    assert!(err.is_unreachable(), "expected unreachable, got {err:?}");
}

#[tokio::test]
async fn test_fetch_stalled_device_times_out() {
    let (server, device) = common::setup_device_mock().await;
    Mock::given(method("GET"))
        .and(path("/Note"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("x")
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let started = std::time::Instant::now();
    let err = device.fetch("Note").await.unwrap_err();
    assert!(err.is_unreachable(), "expected unreachable, got {err:?}");
    assert!(started.elapsed() < std::time::Duration::from_secs(4));
}

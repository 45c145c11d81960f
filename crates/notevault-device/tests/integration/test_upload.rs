//! Integration tests for multipart uploads

use notevault_core::ports::{DeviceError, IRemoteDevice};
use wiremock::{
    matchers::{body_string_contains, header_regex, method, path},
    Mock, ResponseTemplate,
};

use crate::common;

#[tokio::test]
async fn test_upload_posts_multipart_form_named_after_file() {
    let (server, device) = common::setup_device_mock().await;
    Mock::given(method("POST"))
        .and(path("/Document"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains(r#"name="report.pdf""#))
        .and(body_string_contains(r#"filename="report.pdf""#))
        .and(body_string_contains("%PDF-1.7 test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let response = device
        .upload("Document", "report.pdf", b"%PDF-1.7 test".to_vec())
        .await
        .expect("upload");
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_upload_server_error_is_status_error() {
    let (server, device) = common::setup_device_mock().await;
    Mock::given(method("POST"))
        .and(path("/INBOX"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = device
        .upload("INBOX", "book.epub", b"epub".to_vec())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DeviceError::Status {
            uri: "INBOX".into(),
            status: 500
        }
    );
}

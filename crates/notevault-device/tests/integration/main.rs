//! Integration tests for notevault-device
//!
//! Uses wiremock to simulate the device's HTTP file listing and verifies
//! fetches, uploads and error classification of `HttpRemoteDevice`.

mod common;

mod test_fetch;
mod test_upload;

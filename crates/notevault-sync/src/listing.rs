//! Device listing parser
//!
//! The device serves each directory as an HTML page with a single JSON
//! object literal embedded in a script:
//!
//! ```text
//! const json = '{"deviceName":"...","fileList":[{"uri":"/Note/a.note", ...}]}'
//! ```
//!
//! Only the `fileList` array is used.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

static LISTING_JSON_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)const\s+json\s*=\s*'(\{.*?\})'").expect("valid listing pattern")
});

/// One entry of a directory listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingEntry {
    /// Device uri, usually with a leading `/`
    pub uri: Option<String>,
    /// Modification time as shown by the device
    pub date: Option<String>,
    /// Size in bytes
    pub size: u64,
    pub is_directory: bool,
    pub name: Option<String>,
    pub extension: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingDocument {
    #[serde(default)]
    file_list: Vec<ListingEntry>,
}

/// Errors from [`parse_listing`]
#[derive(Debug, Error)]
pub enum ListingError {
    /// The page has no embedded `const json = '...'` object
    #[error("listing page does not contain the embedded file list")]
    MissingMarker,

    /// The embedded object is not valid JSON
    #[error("embedded file list is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Extracts the directory entries from a listing page
///
/// # Errors
/// [`ListingError::MissingMarker`] if the page has no embedded listing, and
/// [`ListingError::Malformed`] if the embedded object does not decode.
pub fn parse_listing(html: &str) -> Result<Vec<ListingEntry>, ListingError> {
    let captures = LISTING_JSON_REGEX
        .captures(html)
        .ok_or(ListingError::MissingMarker)?;
    let document: ListingDocument = serde_json::from_str(&captures[1])?;
    Ok(document.file_list)
}

/// Renders a page the way the device does; used by tests across the crate
#[cfg(test)]
pub(crate) fn render_listing(file_list: serde_json::Value) -> String {
    let json = serde_json::json!({ "deviceName": "Test", "fileList": file_list });
    format!(
        "<!DOCTYPE html><html><body><div id=\"app\"></div><script>\n\
         const json = '{json}'\n\
         console.log('json=' + json)\n\
         </script></body></html>"
    )
}

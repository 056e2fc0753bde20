//! HTTP cache validator module
//!
//! Provides `ETag`/`Last-Modified` generation and conditional request checks.
//! Validators come from file metadata, so the file never has to be read to
//! answer a conditional request.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// IMF-fixdate, the preferred HTTP date format (RFC 9110 5.6.7)
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Generate an `ETag` from file length and modification time
///
/// # Returns
/// Quoted `ETag` string, e.g., `"1a2b3c-400"`
pub fn generate_etag(len: u64, modified: Option<SystemTime>) -> String {
    let mtime = modified
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_nanos());
    format!("\"{mtime:x}-{len:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single `ETag`, comma separated lists, weak validators
/// (`W/"..."`) and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').map(str::trim).any(|e| {
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Format a timestamp as an HTTP date
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE_FORMAT).to_string()
}

/// Check whether the file is unchanged since the client's `If-Modified-Since`
///
/// HTTP dates have one-second resolution, so the modification time is
/// truncated before comparing. Unparseable dates never match.
pub fn not_modified_since(if_modified_since: Option<&str>, modified: Option<SystemTime>) -> bool {
    let (Some(header), Some(modified)) = (if_modified_since, modified) else {
        return false;
    };
    let Ok(since) = DateTime::parse_from_rfc2822(header.trim()) else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}

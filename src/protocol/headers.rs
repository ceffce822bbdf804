//! Version header parsing and formatting.
//!
//! Document versions travel in Braid-style headers as a single quoted, non-negative
//! integer. Unquoted values are accepted on input.
//!
//! | Header | Meaning | Example |
//! |--------|---------|---------|
//! | Version | Version of the state carried by the message | `"12"` |
//! | Parents | Version the sender composed its edit against | `"11"` |
//!
//! # Examples
//!
//! ```
//! use ot_axum_http::protocol::{format_version_header, parse_version_header};
//!
//! assert_eq!(parse_version_header(r#""12""#).unwrap(), 12);
//! assert_eq!(parse_version_header("12").unwrap(), 12);
//! assert_eq!(format_version_header(12), r#""12""#);
//! ```

use crate::error::{OtError, Result};

/// Parse a `Version` or `Parents` header value.
///
/// # Errors
///
/// Returns [`OtError::HeaderParse`] if the value is empty, lists more than one version,
/// or is not a non-negative integer.
pub fn parse_version_header(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    if trimmed.contains(',') {
        return Err(OtError::HeaderParse(format!(
            "expected a single version, got '{}'",
            value
        )));
    }

    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed);

    unquoted
        .parse::<u64>()
        .map_err(|_| OtError::HeaderParse(format!("invalid version: '{}'", value)))
}

/// Format a version as a header value.
#[inline]
pub fn format_version_header(version: u64) -> String {
    format!("\"{}\"", version)
}

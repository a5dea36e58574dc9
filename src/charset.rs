//! Character encoding detection and decoding for raw HTML bodies
//!
//! Mail parts and stored templates reach the converter as bytes. Before the
//! rewrite passes can run they are decoded to UTF-8, using the first charset
//! found by this cascade:
//!
//! 1. **Content-Type**: the `charset` parameter of the part's Content-Type
//! 2. **Meta tags**: `<meta charset>` or `<meta http-equiv="Content-Type">`
//!    within the first 1024 bytes
//! 3. **UTF-8** when neither declares one
//!
//! ```rust
//! use plaintext_converter::charset::{decode_to_utf8, detect_charset};
//!
//! let charset = detect_charset(Some("text/html; charset=ISO-8859-1"), b"<p>caf\xe9</p>");
//! assert_eq!(charset, "ISO-8859-1");
//! assert_eq!(decode_to_utf8(b"<p>caf\xe9</p>", &charset).unwrap(), "<p>caf\u{e9}</p>");
//! ```

use std::borrow::Cow;

use crate::error::ConversionError;
use crate::pattern::{Pattern, group};

/// Charset assumed when nothing is declared
const DEFAULT_CHARSET: &str = "UTF-8";

/// Number of leading bytes scanned for meta charset declarations
const META_SCAN_LIMIT: usize = 1024;

static CONTENT_TYPE_CHARSET: Pattern = Pattern::new(r#"(?i)charset\s*=\s*"?([^";,\s]+)"?"#);
static META_CHARSET: Pattern = Pattern::new(r#"(?i)<meta\s+charset\s*=\s*"?([^";>\s]+)"?"#);
static META_HTTP_EQUIV: Pattern = Pattern::new(
    r#"(?i)<meta\s+http-equiv\s*=\s*"?Content-Type"?\s+content\s*=\s*"?[^">]*charset\s*=\s*([^";>\s]+)"?"#,
);

/// Detect the charset of `html`, normalized to uppercase
///
/// Always returns a charset name; falls back to `UTF-8`.
pub fn detect_charset(content_type: Option<&str>, html: &[u8]) -> String {
    if let Some(ct) = content_type
        && let Some(charset) = extract_charset_from_content_type(ct)
    {
        return normalize_charset(&charset);
    }

    if let Some(charset) = extract_charset_from_html(html) {
        return normalize_charset(&charset);
    }

    DEFAULT_CHARSET.to_string()
}

/// Charset parameter of a Content-Type value
///
/// ```rust
/// use plaintext_converter::charset::extract_charset_from_content_type;
///
/// assert_eq!(
///     extract_charset_from_content_type("text/html; charset=\"utf-8\"; format=flowed"),
///     Some("utf-8".to_string())
/// );
/// assert_eq!(extract_charset_from_content_type("text/html"), None);
/// ```
pub fn extract_charset_from_content_type(content_type: &str) -> Option<String> {
    let regex = CONTENT_TYPE_CHARSET.get().ok()?;
    regex
        .captures(content_type)
        .map(|caps| group(&caps, 1).to_string())
}

/// Charset declared by a meta tag near the start of the document
///
/// Only the first 1024 bytes are scanned. The HTML5 `<meta charset>` form
/// wins over the `http-equiv` form.
pub fn extract_charset_from_html(html: &[u8]) -> Option<String> {
    let prefix = &html[..html.len().min(META_SCAN_LIMIT)];
    // Lossy is fine here, the declaration itself is ASCII
    let prefix = String::from_utf8_lossy(prefix);

    for pattern in [&META_CHARSET, &META_HTTP_EQUIV] {
        let regex = pattern.get().ok()?;
        if let Some(caps) = regex.captures(&prefix) {
            return Some(group(&caps, 1).to_string());
        }
    }

    None
}

pub fn normalize_charset(charset: &str) -> String {
    charset.to_uppercase()
}

/// Decode `bytes` from `charset` to UTF-8
///
/// UTF-8 input is borrowed when valid. Malformed sequences are rejected
/// instead of being replaced, so a wrong charset declaration surfaces as an
/// [`ConversionError::EncodingError`].
pub fn decode_to_utf8<'a>(bytes: &'a [u8], charset: &str) -> Result<Cow<'a, str>, ConversionError> {
    if charset.eq_ignore_ascii_case(DEFAULT_CHARSET) {
        return std::str::from_utf8(bytes).map(Cow::Borrowed).map_err(|e| {
            ConversionError::EncodingError(format!(
                "Invalid UTF-8 at byte position {}: {}",
                e.valid_up_to(),
                e
            ))
        });
    }

    let encoding = encoding_rs::Encoding::for_label(charset.as_bytes()).ok_or_else(|| {
        ConversionError::EncodingError(format!("Unsupported charset '{}'", charset))
    })?;

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| {
            ConversionError::EncodingError(format!(
                "Invalid byte sequence for charset '{}'",
                charset
            ))
        })
}

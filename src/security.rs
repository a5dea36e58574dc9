//! Resource limits and link policy for untrusted HTML input
//!
//! The converter runs on attacker-influenced markup (mail bodies, user
//! generated content). This module holds the guards that keep one conversion
//! bounded:
//!
//! - **Input size**: oversized documents are rejected before any pass runs
//! - **Quote nesting**: each nested blockquote is converted by a recursive
//!   pipeline call, so recursion depth is capped
//! - **Ignored link schemes**: `javascript:`, `mailto:`, `tel:` and bare
//!   fragments are never rendered as links nor added to the footnote list

use crate::entities::decode_entities;
use crate::error::ConversionError;

/// Maximum accepted input size in bytes (10 MiB)
pub const MAX_INPUT_SIZE: usize = 10 * 1024 * 1024;

/// Maximum nesting depth for quoted blocks
pub const MAX_QUOTE_DEPTH: usize = 32;

/// Link targets that are rendered as plain text only
const IGNORED_LINK_PREFIXES: &[&str] = &[
    "javascript:", // Script execution, meaningless in plaintext
    "mailto:",     // The address is usually the link text already
    "tel:",        // Same for phone numbers
    "#",           // In-document fragment
];

/// Limits applied to a single top-level conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLimits {
    /// Maximum input size in bytes
    pub max_input_size: usize,
    /// Maximum quoted-block nesting depth
    pub max_quote_depth: usize,
}

impl InputLimits {
    /// Create limits with default settings
    pub fn new() -> Self {
        Self {
            max_input_size: MAX_INPUT_SIZE,
            max_quote_depth: MAX_QUOTE_DEPTH,
        }
    }

    /// Create limits with a custom maximum quote depth
    pub fn with_max_quote_depth(max_quote_depth: usize) -> Self {
        Self {
            max_quote_depth,
            ..Self::new()
        }
    }

    /// Validate input size
    ///
    /// # Examples
    ///
    /// ```
    /// use plaintext_converter::security::InputLimits;
    ///
    /// let limits = InputLimits { max_input_size: 4, ..InputLimits::new() };
    /// assert!(limits.validate_size("abcd").is_ok());
    /// assert!(limits.validate_size("abcde").is_err());
    /// ```
    pub fn validate_size(&self, input: &str) -> Result<(), ConversionError> {
        if input.len() > self.max_input_size {
            Err(ConversionError::InputTooLarge {
                size: input.len(),
                limit: self.max_input_size,
            })
        } else {
            Ok(())
        }
    }

    /// Validate quoted-block nesting depth
    ///
    /// # Examples
    ///
    /// ```
    /// use plaintext_converter::security::InputLimits;
    ///
    /// let limits = InputLimits::with_max_quote_depth(3);
    /// assert!(limits.validate_depth(3).is_ok());
    /// assert!(limits.validate_depth(4).is_err());
    /// ```
    pub fn validate_depth(&self, depth: usize) -> Result<(), ConversionError> {
        if depth > self.max_quote_depth {
            Err(ConversionError::NestingTooDeep {
                depth,
                limit: self.max_quote_depth,
            })
        } else {
            Ok(())
        }
    }
}

impl Default for InputLimits {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a link target should be rendered as plain text only
///
/// The URL is entity-decoded first so that `javascript&#58;` cannot slip
/// through. Matching is case-insensitive.
///
/// # Examples
///
/// ```
/// use plaintext_converter::security::is_ignored_link;
///
/// assert!(is_ignored_link("JavaScript:void(0)"));
/// assert!(is_ignored_link("mailto:team@example.com"));
/// assert!(is_ignored_link("#top"));
/// assert!(!is_ignored_link("https://example.com/#top"));
/// ```
pub fn is_ignored_link(url: &str) -> bool {
    let decoded = decode_entities(url).to_lowercase();
    IGNORED_LINK_PREFIXES
        .iter()
        .any(|prefix| decoded.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ignored_links() {
        assert!(is_ignored_link("javascript:alert(1)"));
        assert!(is_ignored_link("TEL:+4912345"));
        assert!(is_ignored_link("javascript&#58;alert(1)"));
        assert!(is_ignored_link("#section-2"));

        assert!(!is_ignored_link("https://example.com"));
        assert!(!is_ignored_link("/relative/path"));
        assert!(!is_ignored_link("ftp://files.example.com"));
    }

    #[test]
    fn test_depth_validation() {
        let limits = InputLimits::with_max_quote_depth(10);

        assert!(limits.validate_depth(0).is_ok());
        assert!(limits.validate_depth(10).is_ok());
        match limits.validate_depth(11) {
            Err(ConversionError::NestingTooDeep { depth: 11, limit: 10 }) => (),
            other => panic!("Expected NestingTooDeep, got: {:?}", other),
        }
    }

    #[test]
    fn test_size_validation() {
        let limits = InputLimits {
            max_input_size: 8,
            ..InputLimits::new()
        };
        assert!(limits.validate_size("12345678").is_ok());
        match limits.validate_size("123456789") {
            Err(ConversionError::InputTooLarge { size: 9, limit: 8 }) => (),
            other => panic!("Expected InputTooLarge, got: {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn prop_ignored_schemes_match_regardless_of_case(
            payload in "[A-Za-z0-9_/?=&:%.-]{0,64}",
            uppercase in any::<bool>(),
        ) {
            for scheme in ["javascript:", "mailto:", "tel:", "#"] {
                let scheme_variant = if uppercase {
                    scheme.to_uppercase()
                } else {
                    scheme.to_string()
                };
                let candidate = format!("{scheme_variant}{payload}");
                prop_assert!(
                    is_ignored_link(&candidate),
                    "Ignored scheme should be detected regardless of case: {candidate}"
                );
            }
        }
    }
}

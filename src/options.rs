//! Conversion options
//!
//! Options are plain values, immutable for the duration of a conversion. The
//! quoted-block handler derives a narrowed copy for its recursive calls
//! instead of mutating the caller's options.
//!
//! Template and expression contexts hand options over as loose maps, so
//! [`ConversionOptions`] deserializes from a partial map merged over the
//! defaults:
//!
//! ```rust
//! use plaintext_converter::options::{ConversionOptions, LinkMode};
//!
//! let value = serde_json::json!({ "links": "table", "width": 0 });
//! let options = ConversionOptions::from_value(&value).unwrap();
//! assert_eq!(options.links, LinkMode::Table);
//! assert_eq!(options.width, 0);
//! assert!(options.image_alt_text);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConversionError;

/// Ruler length used when wrapping is disabled
pub const DEFAULT_RULE_WIDTH: usize = 25;

/// Default wrap width
pub const DEFAULT_WIDTH: usize = 70;

/// Option keys understood by [`ConversionOptions::from_value`]
const KNOWN_KEYS: &[&str] = &["links", "width", "imageAltText"];

/// How links are rendered in the plaintext output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "LinkModeValue")]
pub enum LinkMode {
    /// Only the link text is rendered
    Off,
    /// `text [url]`
    #[default]
    Inline,
    /// `text [n]` plus a numbered footnote list at the end
    Table,
    /// `text` followed by `[url]` on the next line
    NextLine,
    /// `[url=url]text[/url]`
    BbCode,
}

impl LinkMode {
    /// Resolve a per-link override token
    ///
    /// Unknown tokens select [`LinkMode::Inline`].
    pub fn from_override(token: &str) -> Self {
        token.parse().unwrap_or(LinkMode::Inline)
    }

    /// Whether links are rendered at all
    pub fn is_enabled(self) -> bool {
        self != LinkMode::Off
    }
}

impl FromStr for LinkMode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "off" | "none" | "false" => Ok(LinkMode::Off),
            "inline" | "true" => Ok(LinkMode::Inline),
            "table" => Ok(LinkMode::Table),
            "nextline" => Ok(LinkMode::NextLine),
            "bbcode" => Ok(LinkMode::BbCode),
            other => Err(ConversionError::InvalidInput(format!(
                "unknown link mode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkMode::Off => "off",
            LinkMode::Inline => "inline",
            LinkMode::Table => "table",
            LinkMode::NextLine => "nextline",
            LinkMode::BbCode => "bbcode",
        };
        f.write_str(name)
    }
}

/// Raw link mode as found in an option map: a name or a boolean toggle
#[derive(Deserialize)]
#[serde(untagged)]
enum LinkModeValue {
    Flag(bool),
    Name(String),
}

impl TryFrom<LinkModeValue> for LinkMode {
    type Error = ConversionError;

    fn try_from(value: LinkModeValue) -> Result<Self, Self::Error> {
        match value {
            LinkModeValue::Flag(false) => Ok(LinkMode::Off),
            LinkModeValue::Flag(true) => Ok(LinkMode::Inline),
            LinkModeValue::Name(name) => name.parse(),
        }
    }
}

/// Conversion options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Link rendering mode
    pub links: LinkMode,
    /// Wrap width in columns (0 disables wrapping)
    pub width: usize,
    /// Render `[alt]` for images carrying alt text
    pub image_alt_text: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            links: LinkMode::Inline,
            width: DEFAULT_WIDTH,
            image_alt_text: true,
        }
    }
}

impl ConversionOptions {
    /// Merge a JSON-like option map over the defaults
    ///
    /// Unknown keys are ignored with a warning. A value that is not an object,
    /// or an invalid value for a known key, is rejected.
    pub fn from_value(value: &Value) -> Result<Self, ConversionError> {
        let map = value.as_object().ok_or_else(|| {
            ConversionError::InvalidInput(format!("options must be a map, got {}", value))
        })?;

        for key in map.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                tracing::warn!(key = %key, "Ignoring unknown conversion option");
            }
        }

        Self::deserialize(value)
            .map_err(|e| ConversionError::InvalidInput(format!("invalid options: {}", e)))
    }

    /// Options for the content of a quoted block: two columns narrower, so
    /// the `> ` marker fits. Unlimited width stays unlimited.
    pub fn for_nested_quote(&self) -> Self {
        Self {
            width: self.width.saturating_sub(2),
            ..self.clone()
        }
    }

    /// Length of horizontal rules
    pub fn rule_width(&self) -> usize {
        if self.width == 0 {
            DEFAULT_RULE_WIDTH
        } else {
            self.width
        }
    }
}

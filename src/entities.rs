//! Entity and whitespace normalization
//!
//! Low-level text cleanup used by the later passes of the pipeline:
//!
//! - entity decoding/encoding (delegated to `html-escape`)
//! - protection of literal ampersands while entities are being processed
//! - removal of entity syntax that survived decoding
//! - blank-line normalization
//! - greedy word wrapping
//!
//! # Ampersand protection
//!
//! `&amp;` and bare `&` are swapped for a private placeholder before entities
//! are decoded. Otherwise an input like `&amp;quot;` would decode to `&quot;`
//! and then be stripped as an unknown entity. The placeholder is turned back
//! into a literal `&` only after all entity processing is done.

use std::borrow::Cow;

use regex::Captures;

use crate::error::ConversionError;
use crate::pattern::Pattern;

/// Stand-in for a literal `&` while entities are processed
const AMPERSAND_PLACEHOLDER: &str = "\u{E000}amp\u{E000}";

/// Entities with fixed substitutes, applied before generic decoding.
/// `&#153;` and `&#151;` are the windows-1252 code points for these glyphs,
/// which a standards decoder would map to C1 control characters instead.
const SPECIAL_ENTITIES: &[(&str, &str)] = &[
    ("&#153;", "\u{2122}"),
    ("&#151;", "\u{2014}"),
    ("&#39;", "'"),
];

static AMPERSAND: Pattern = Pattern::new(r"(?i)&(?:(?:amp|#38);|(#?[a-z0-9]+;))?");
static SPACE_RUNS: Pattern = Pattern::new(r"[ ]{2,}");
static UNKNOWN_ENTITY: Pattern = Pattern::new(r"&(?:[a-zA-Z0-9]{2,6}|#[0-9]{2,4});");
static BLANK_LINE: Pattern = Pattern::new(r"\n[[:space:]]+\n");
static NEWLINE_RUNS: Pattern = Pattern::new(r"\n{3,}");

/// Decode named and numeric HTML entities
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Encode `&`, `<`, `>` and `"` as entities
///
/// Single quotes are left alone so that uppercased text round-trips through
/// [`decode_entities`] unchanged.
pub fn encode_entities(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// Remove any `&name;` or `&#digits;` sequence left over after decoding
///
/// # Examples
///
/// ```rust
/// use plaintext_converter::entities::strip_unknown_entities;
///
/// assert_eq!(strip_unknown_entities("a&bogus;b").unwrap(), "ab");
/// assert_eq!(strip_unknown_entities("a&#1234;b").unwrap(), "ab");
/// assert_eq!(strip_unknown_entities("a & b").unwrap(), "a & b");
/// ```
pub fn strip_unknown_entities(text: &str) -> Result<String, ConversionError> {
    Ok(UNKNOWN_ENTITY.get()?.replace_all(text, "").into_owned())
}

/// Replace the entities that have fixed textual substitutes
pub fn replace_special_entities(text: &str) -> String {
    SPECIAL_ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, glyph)| {
            acc.replace(entity, glyph)
        })
}

/// Swap `&amp;`, `&#38;` and bare `&` for the private placeholder
///
/// Any other entity reference is left for the decoder.
pub fn protect_ampersands(text: &str) -> Result<String, ConversionError> {
    let replaced = AMPERSAND.get()?.replace_all(text, |caps: &Captures| {
        if caps.get(1).is_some() {
            caps[0].to_string()
        } else {
            AMPERSAND_PLACEHOLDER.to_string()
        }
    });
    Ok(replaced.into_owned())
}

/// Turn the placeholder back into a literal `&`
pub fn restore_ampersands(text: &str) -> String {
    text.replace(AMPERSAND_PLACEHOLDER, "&")
}

/// Run the full entity pass in order: special entities, ampersand
/// protection, space-run collapsing, generic decoding, unknown-entity
/// stripping and finally ampersand restoration
pub fn normalize_entities(text: &str) -> Result<String, ConversionError> {
    let text = replace_special_entities(text);
    let text = protect_ampersands(&text)?;
    let text = SPACE_RUNS.get()?.replace_all(&text, " ");
    let text = decode_entities(&text);
    let text = strip_unknown_entities(&text)?;
    Ok(restore_ampersands(&text))
}

/// Normalize blank lines
///
/// Lines holding only whitespace become empty, three or more consecutive
/// newlines collapse to two, and leading newlines are removed. Non-breaking
/// spaces count as content, so preformatted indentation survives.
///
/// # Examples
///
/// ```rust
/// use plaintext_converter::entities::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("\n\na\n \t\n\n\nb").unwrap(), "a\n\nb");
/// ```
pub fn collapse_whitespace(text: &str) -> Result<String, ConversionError> {
    let text = BLANK_LINE.get()?.replace_all(text, "\n\n");
    let text = NEWLINE_RUNS.get()?.replace_all(&text, "\n\n");
    Ok(text.trim_start_matches('\n').to_string())
}

/// Greedy word wrap at `width` columns
///
/// Breaks replace a space; words longer than `width` are never split. Existing
/// newlines restart the column count. Columns are counted in characters.
/// A width of 0 disables wrapping.
///
/// # Examples
///
/// ```rust
/// use plaintext_converter::entities::wrap;
///
/// assert_eq!(wrap("The quick brown fox", 10), "The quick\nbrown fox");
/// assert_eq!(wrap("The quick brown fox", 0), "The quick brown fox");
/// ```
pub fn wrap(text: &str, width: usize) -> Cow<'_, str> {
    if width == 0 {
        return Cow::Borrowed(text);
    }

    let mut chars: Vec<char> = text.chars().collect();
    let mut line_start = 0;
    let mut last_space = 0;

    for current in 0..chars.len() {
        match chars[current] {
            '\n' => {
                line_start = current + 1;
                last_space = current + 1;
            }
            ' ' => {
                if current - line_start >= width {
                    chars[current] = '\n';
                    line_start = current + 1;
                }
                last_space = current;
            }
            _ if current - line_start >= width && line_start != last_space => {
                chars[last_space] = '\n';
                line_start = last_space + 1;
            }
            _ => {}
        }
    }

    Cow::Owned(chars.into_iter().collect())
}

/// Trim the whitespace set HTML authors put around markup: space, tab,
/// CR, LF, vertical tab and NUL. Non-breaking spaces are kept.
pub fn trim_markup(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B'))
}

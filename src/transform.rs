//! Tag-aware text transforms: uppercasing, strike-through rendering and
//! final markup stripping

use crate::entities::{decode_entities, encode_entities};
use crate::error::ConversionError;
use crate::pattern::Pattern;

/// Combining long stroke overlay, drawn over the preceding character
pub const COMBINING_LONG_STROKE: char = '\u{0336}';

static TAG: Pattern = Pattern::new(r"<[^>]*>");
static MARKUP: Pattern = Pattern::new(r"(?s)<!--.*?-->|<[^\s>][^>]*>");

/// Uppercase text while leaving markup tags untouched
///
/// The text is split into alternating tag and non-tag spans. Only the non-tag
/// spans are transformed: entities are decoded first so that `&eacute;`
/// becomes `É` rather than the bogus `&EACUTE;`, then the span is uppercased
/// and re-encoded so that a literal `<` cannot turn into markup.
///
/// # Examples
///
/// ```rust
/// use plaintext_converter::transform::upper_preserving_tags;
///
/// assert_eq!(
///     upper_preserving_tags("caf&eacute; <a href=\"x\">menu</a>").unwrap(),
///     "CAF\u{c9} <a href=\"x\">MENU</a>"
/// );
/// ```
pub fn upper_preserving_tags(text: &str) -> Result<String, ConversionError> {
    let tag = TAG.get()?;
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for m in tag.find_iter(text) {
        output.push_str(&upper_span(&text[last..m.start()]));
        output.push_str(m.as_str());
        last = m.end();
    }
    output.push_str(&upper_span(&text[last..]));

    Ok(output)
}

fn upper_span(span: &str) -> String {
    if span.is_empty() {
        return String::new();
    }
    encode_entities(&decode_entities(span).to_uppercase())
}

/// Render text as struck through by following every character with
/// [`COMBINING_LONG_STROKE`]
///
/// # Examples
///
/// ```rust
/// use plaintext_converter::transform::strikethrough;
///
/// assert_eq!(strikethrough("ab"), "a\u{336}b\u{336}");
/// ```
pub fn strikethrough(text: &str) -> String {
    let mut output = String::with_capacity(text.len() * 3);
    for ch in text.chars() {
        output.push(ch);
        output.push(COMBINING_LONG_STROKE);
    }
    output
}

/// Remove comments and any remaining markup tags, keeping their text content
///
/// A `<` followed by whitespace is not a tag opener and stays in the text, as
/// does an unterminated `<tag` at the end of the input.
///
/// # Examples
///
/// ```rust
/// use plaintext_converter::transform::strip_tags;
///
/// assert_eq!(strip_tags("<span>a</span> < b<!-- note -->").unwrap(), "a < b");
/// ```
pub fn strip_tags(text: &str) -> Result<String, ConversionError> {
    Ok(MARKUP.get()?.replace_all(text, "").into_owned())
}

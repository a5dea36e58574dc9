//! Quoted block handling
//!
//! Blockquotes may nest. Only the outermost pairs are handled at each level:
//! their content is run through the whole pipeline again with a narrower
//! width, every resulting line gets a `> ` marker, and the result is escaped
//! and wrapped in `<pre>` so the preformatted pass keeps its layout. Nested
//! quotes inside that content are resolved by the recursive call, which is how
//! markers accumulate (`>> `) per nesting level.
//!
//! Recursion depth is tracked in the [`ConversionContext`] and capped by
//! [`InputLimits::max_quote_depth`](crate::security::InputLimits).

use crate::converter::{ConversionContext, convert_fragment};
use crate::entities::{encode_entities, trim_markup};
use crate::error::ConversionError;
use crate::options::ConversionOptions;
use crate::pattern::Pattern;

static QUOTE_TAG: Pattern = Pattern::new(r"(?i)</*blockquote[^>]*>");
static LINE_START: Pattern = Pattern::new(r"(?:^|\n)>*");

/// Replace every outermost `<blockquote>` pair of `text` with its rendered,
/// quote-marked content
///
/// Close tags without a matching open tag are ignored. An open tag that is
/// never closed is left in place for the later passes to strip.
pub fn convert_blockquotes(
    text: &str,
    options: &ConversionOptions,
    ctx: &mut ConversionContext,
) -> Result<String, ConversionError> {
    let quote_tag = QUOTE_TAG.get()?;
    if !quote_tag.is_match(text) {
        return Ok(text.to_string());
    }

    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut level = 0usize;
    // Start of the outermost open tag and start of its content
    let mut open = (0, 0);

    for tag in quote_tag.find_iter(text) {
        ctx.increment_and_check()?;

        if !tag.as_str().starts_with("</") {
            if level == 0 {
                open = (tag.start(), tag.end());
            }
            level += 1;
            continue;
        }

        if level == 0 {
            continue;
        }
        level -= 1;
        if level > 0 {
            continue;
        }

        let (start, content_start) = open;
        let rendered = render_quote(&text[content_start..tag.start()], options, ctx)?;
        output.push_str(&text[cursor..start]);
        output.push_str(&rendered);
        cursor = tag.end();
    }
    output.push_str(&text[cursor..]);

    Ok(output)
}

fn render_quote(
    content: &str,
    options: &ConversionOptions,
    ctx: &mut ConversionContext,
) -> Result<String, ConversionError> {
    ctx.enter_quote()?;
    let nested = options.for_nested_quote();
    tracing::trace!(depth = ctx.quote_depth(), width = nested.width, "Converting quoted block");
    let converted = convert_fragment(trim_markup(content), &nested, ctx);
    ctx.leave_quote();
    let converted = converted?;

    let marked = LINE_START.get()?.replace_all(trim_markup(&converted), "${0}> ");
    Ok(format!("<pre>{}</pre>", encode_entities(&marked)))
}

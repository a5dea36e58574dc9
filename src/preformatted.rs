//! Preformatted block handling
//!
//! `<pre>` content must keep its line breaks and runs of spaces, but every
//! later pass of the pipeline either flattens or collapses whitespace. Each
//! block is therefore rendered up front: its whitespace is turned into
//! `<br>` tags and `&nbsp;` entities, which survive the later passes and are
//! only turned back into characters by the final entity pass.

use crate::callbacks::apply_callbacks;
use crate::converter::ConversionContext;
use crate::error::ConversionError;
use crate::options::ConversionOptions;
use crate::pattern::{Pattern, group};

static PRE_BLOCK: Pattern = Pattern::new(r"(?is)<pre[^>]*?>(.*?)</pre>");
static BREAK_TAG: Pattern = Pattern::new(r"(?i)<br\b[^>]*>");
static PRE_OPEN_TAG: Pattern = Pattern::new(r"<pre[^>]*>");

const TAB_SPACES: &str = "&nbsp;&nbsp;&nbsp;&nbsp;";

/// Render every `<pre>` block of `text`, first block first
///
/// Each block is replaced by a `<div><br>…<br></div>` shell holding the
/// protected content. The output is assembled in a single scan and the
/// rendered content is copied in literally, so `$` sequences in the block are
/// never read as capture references.
pub fn convert_preformatted(
    text: &str,
    options: &ConversionOptions,
    ctx: &mut ConversionContext,
) -> Result<String, ConversionError> {
    let pre_block = PRE_BLOCK.get()?;
    if !pre_block.is_match(text) {
        return Ok(text.to_string());
    }

    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;

    for caps in pre_block.captures_iter(text) {
        ctx.increment_and_check()?;

        let Some(whole) = caps.get(0) else {
            continue;
        };
        output.push_str(&text[cursor..whole.start()]);
        output.push_str(&render_block(group(&caps, 1), options, ctx)?);
        cursor = whole.end();
    }
    output.push_str(&text[cursor..]);

    Ok(output)
}

fn render_block(
    content: &str,
    options: &ConversionOptions,
    ctx: &mut ConversionContext,
) -> Result<String, ConversionError> {
    let content = BREAK_TAG.get()?.replace_all(content, "\n");
    let content = apply_callbacks(&content, options, ctx)?;

    let content = content
        .replace('\n', "<br>")
        .replace('\t', TAB_SPACES)
        .replace(' ', "&nbsp;");
    let content = PRE_OPEN_TAG.get()?.replace_all(&content, "");
    let content = content.replace("</pre>", "");

    Ok(format!("<div><br>{content}<br></div>"))
}

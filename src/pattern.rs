//! Lazily compiled regular expressions shared by the rewrite passes
//!
//! Every pass of the pipeline is a set of hardcoded patterns. They are compiled
//! once on first use and cached for the lifetime of the process. A pattern that
//! fails to compile surfaces as [`ConversionError::InternalError`] at the call
//! site instead of panicking.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::error::ConversionError;

/// A regular expression compiled on first use
pub(crate) struct Pattern {
    source: &'static str,
    compiled: OnceLock<Result<Regex, regex::Error>>,
}

impl Pattern {
    pub(crate) const fn new(source: &'static str) -> Self {
        Self {
            source,
            compiled: OnceLock::new(),
        }
    }

    /// Get the compiled regex, compiling it on first access
    pub(crate) fn get(&self) -> Result<&Regex, ConversionError> {
        self.compiled
            .get_or_init(|| Regex::new(self.source))
            .as_ref()
            .map_err(|e| {
                ConversionError::InternalError(format!("invalid pattern {:?}: {}", self.source, e))
            })
    }
}

/// Replace every match of `regex` with the output of a fallible renderer
///
/// Rendered text is inserted literally; `$` in the output is never expanded.
pub(crate) fn try_replace_all<F>(
    regex: &Regex,
    text: &str,
    mut render: F,
) -> Result<String, ConversionError>
where
    F: FnMut(&Captures<'_>) -> Result<String, ConversionError>,
{
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for caps in regex.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        output.push_str(&text[last..whole.start()]);
        output.push_str(&render(&caps)?);
        last = whole.end();
    }
    output.push_str(&text[last..]);

    Ok(output)
}

/// Text of capture group `index`, or the empty string if it did not participate
pub(crate) fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str())
}

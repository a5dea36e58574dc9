//! HTML to plaintext converter
//!
//! This module holds the pipeline orchestrator. A conversion is a fixed
//! sequence of text rewriting passes over the whole document:
//!
//! 1. Quoted blocks ([`blockquote`](crate::blockquote)), recursively
//! 2. Preformatted blocks ([`preformatted`](crate::preformatted))
//! 3. Static substitution table ([`rules`](crate::rules))
//! 4. Callback dispatch ([`callbacks`](crate::callbacks))
//! 5. Removal of all remaining tags
//! 6. Entity normalization
//! 7. Blank line normalization
//! 8. Word wrap, when a width is set
//!
//! At the top level the input is trimmed first and the footnote link list is
//! appended last. Quoted blocks re-enter the pipeline at step 1 for their
//! content, sharing the same [`ConversionContext`].
//!
//! # Examples
//!
//! ```rust
//! use plaintext_converter::converter::PlaintextConverter;
//!
//! let converter = PlaintextConverter::new();
//! let text = converter
//!     .convert("<h1>Welcome</h1><p>Read the <a href=\"https://x.test/\">docs</a>.</p>")
//!     .unwrap();
//! assert_eq!(text, "WELCOME\n\nRead the docs [https://x.test/].\n");
//! ```

use std::time::{Duration, Instant};

use crate::blockquote::convert_blockquotes;
use crate::callbacks::apply_callbacks;
use crate::charset::{decode_to_utf8, detect_charset};
use crate::entities::{collapse_whitespace, normalize_entities, trim_markup, wrap};
use crate::error::ConversionError;
use crate::links::LinkList;
use crate::options::ConversionOptions;
use crate::preformatted::convert_preformatted;
use crate::rules::apply_substitutions;
use crate::security::InputLimits;
use crate::transform::strip_tags;

/// Number of checkpoints between two timeout checks
const CHECKPOINT_INTERVAL: u32 = 100;

/// Per-call conversion state
///
/// Holds everything a single top-level conversion mutates: the footnote link
/// list, the quoted-block recursion depth and the cooperative timeout. A new
/// context is created for every conversion, so concurrent conversions never
/// share state.
///
/// # Timeout Strategy
///
/// The timeout is cooperative. Passes call
/// [`increment_and_check`](Self::increment_and_check) for every match they
/// handle and the clock is read every 100 calls; the orchestrator also checks
/// between passes. A runaway conversion is therefore noticed at the next
/// checkpoint, not interrupted.
///
/// ```rust
/// use std::time::Duration;
/// use plaintext_converter::converter::ConversionContext;
///
/// let ctx = ConversionContext::new(Duration::from_secs(5));
/// assert!(ctx.check_timeout().is_ok());
/// assert!(ctx.links().is_empty());
/// ```
#[derive(Debug)]
pub struct ConversionContext {
    /// Start time of conversion
    start_time: Instant,
    /// Timeout duration (0 means no timeout)
    timeout: Duration,
    /// Matches handled so far, for checkpoint frequency
    checkpoint_count: u32,
    /// Current quoted-block nesting depth
    quote_depth: usize,
    limits: InputLimits,
    links: LinkList,
}

impl ConversionContext {
    /// Create a context with default limits
    ///
    /// # Arguments
    ///
    /// * `timeout` - Maximum duration for conversion (`Duration::ZERO` means no timeout)
    pub fn new(timeout: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            timeout,
            checkpoint_count: 0,
            quote_depth: 0,
            limits: InputLimits::default(),
            links: LinkList::new(),
        }
    }

    pub fn with_limits(mut self, limits: InputLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Check if timeout has been exceeded
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use plaintext_converter::converter::ConversionContext;
    ///
    /// let ctx = ConversionContext::new(Duration::from_millis(10));
    /// std::thread::sleep(Duration::from_millis(30));
    /// assert!(ctx.check_timeout().is_err());
    /// ```
    pub fn check_timeout(&self) -> Result<(), ConversionError> {
        if self.timeout.is_zero() {
            return Ok(());
        }

        if self.start_time.elapsed() > self.timeout {
            return Err(ConversionError::Timeout);
        }

        Ok(())
    }

    /// Count one checkpoint and check the timeout every 100 checkpoints
    pub fn increment_and_check(&mut self) -> Result<(), ConversionError> {
        self.checkpoint_count = self.checkpoint_count.wrapping_add(1);

        if self.checkpoint_count.is_multiple_of(CHECKPOINT_INTERVAL) {
            self.check_timeout()?;
        }

        Ok(())
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn checkpoint_count(&self) -> u32 {
        self.checkpoint_count
    }

    pub fn quote_depth(&self) -> usize {
        self.quote_depth
    }

    /// Enter one quoted-block level, failing if the depth limit is exceeded
    ///
    /// On failure the depth is left unchanged.
    pub fn enter_quote(&mut self) -> Result<(), ConversionError> {
        let depth = self.quote_depth + 1;
        self.limits.validate_depth(depth)?;
        self.quote_depth = depth;
        Ok(())
    }

    pub fn leave_quote(&mut self) {
        self.quote_depth = self.quote_depth.saturating_sub(1);
    }

    /// Links recorded so far in table mode
    pub fn links(&self) -> &LinkList {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut LinkList {
        &mut self.links
    }
}

/// Run the pass sequence over one fragment
///
/// Shared by the top-level conversion and by quoted blocks, which call it
/// recursively with narrowed options.
pub(crate) fn convert_fragment(
    text: &str,
    options: &ConversionOptions,
    ctx: &mut ConversionContext,
) -> Result<String, ConversionError> {
    let text = convert_blockquotes(text, options, ctx)?;
    let text = convert_preformatted(&text, options, ctx)?;
    ctx.check_timeout()?;

    let text = apply_substitutions(&text, options)?;
    let text = apply_callbacks(&text, options, ctx)?;
    ctx.check_timeout()?;

    let text = strip_tags(&text)?;
    let text = normalize_entities(&text)?;
    let text = collapse_whitespace(&text)?;

    Ok(wrap(&text, options.width).into_owned())
}

/// Main plaintext converter
///
/// Holds immutable configuration only; every call builds its own
/// [`ConversionContext`], so one converter can serve concurrent callers.
///
/// ```rust
/// use std::time::Duration;
/// use plaintext_converter::converter::PlaintextConverter;
/// use plaintext_converter::options::{ConversionOptions, LinkMode};
///
/// let converter = PlaintextConverter::with_options(ConversionOptions {
///     links: LinkMode::Table,
///     ..Default::default()
/// })
/// .with_timeout(Duration::from_secs(2));
///
/// let text = converter.convert("<a href=\"https://x.test/\">Click</a>").unwrap();
/// assert_eq!(text, "Click [1]\n\nLinks:\n------\n[1] https://x.test/\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlaintextConverter {
    options: ConversionOptions,
    limits: InputLimits,
    timeout: Duration,
}

impl PlaintextConverter {
    /// Create a converter with default options, default limits and no timeout
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConversionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn with_limits(mut self, limits: InputLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the cooperative timeout (`Duration::ZERO` disables it)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert an HTML fragment to plaintext
    pub fn convert(&self, html: &str) -> Result<String, ConversionError> {
        let mut ctx = ConversionContext::new(self.timeout).with_limits(self.limits);
        self.convert_with_context(html, &mut ctx)
    }

    /// Convert an HTML fragment, logging the outcome under `label`
    ///
    /// The label only appears in log events; it does not affect the output.
    pub fn convert_labeled(
        &self,
        html: &str,
        label: Option<&str>,
    ) -> Result<String, ConversionError> {
        let label = label.unwrap_or_default();
        match self.convert(html) {
            Ok(text) => {
                tracing::debug!(
                    label,
                    input_len = html.len(),
                    output_len = text.len(),
                    "Successfully converted HTML to plaintext"
                );
                Ok(text)
            }
            Err(e) => {
                tracing::error!(label, error = %e, code = e.code(), "Convert HTML to plaintext failed");
                Err(e)
            }
        }
    }

    /// Convert with a caller-supplied context
    ///
    /// The converter's [`InputLimits`] replace those of `ctx`, so the size and
    /// quote depth limits always come from the same place. The context keeps
    /// its timeout, checkpoint count and link list.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::InputTooLarge`] before any pass runs
    /// - [`ConversionError::NestingTooDeep`] for quotes nested past the limit
    /// - [`ConversionError::Timeout`] once the context's timeout is exceeded
    pub fn convert_with_context(
        &self,
        html: &str,
        ctx: &mut ConversionContext,
    ) -> Result<String, ConversionError> {
        ctx.limits = self.limits;
        self.limits.validate_size(html)?;

        let mut text = convert_fragment(trim_markup(html), &self.options, ctx)?;
        text.push_str(&ctx.links().render_footnote());

        ctx.check_timeout()?;
        Ok(text)
    }

    /// Decode a raw HTML body and convert it
    ///
    /// The charset comes from `content_type`, a meta tag, or defaults to
    /// UTF-8, in that order.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        content_type: Option<&str>,
        label: Option<&str>,
    ) -> Result<String, ConversionError> {
        if bytes.len() > self.limits.max_input_size {
            return Err(ConversionError::InputTooLarge {
                size: bytes.len(),
                limit: self.limits.max_input_size,
            });
        }

        let charset = detect_charset(content_type, bytes);
        let html = decode_to_utf8(bytes, &charset).inspect_err(|e| {
            tracing::error!(label = label.unwrap_or_default(), charset = %charset, error = %e, "Failed to decode HTML body");
        })?;
        self.convert_labeled(&html, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LinkMode;
    use pretty_assertions::assert_eq;

    fn convert(html: &str) -> String {
        PlaintextConverter::new().convert(html).unwrap()
    }

    fn convert_with(html: &str, options: ConversionOptions) -> String {
        PlaintextConverter::with_options(options).convert(html).unwrap()
    }

    fn unlimited() -> ConversionOptions {
        ConversionOptions {
            width: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_heading() {
        assert_eq!(convert("<h1>Title</h1>"), "TITLE\n\n");
    }

    #[test]
    fn test_plain_text_round_trips() {
        assert_eq!(convert("  just some words  "), "just some words");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert(""), "");
        assert_eq!(convert(" \n\t "), "");
    }

    #[test]
    fn test_anchor_inline() {
        assert_eq!(
            convert_with("<a href=\"https://x.test/\">Click</a>", unlimited()),
            "Click [https://x.test/]"
        );
    }

    #[test]
    fn test_anchor_table_footnote() {
        let options = ConversionOptions {
            links: LinkMode::Table,
            ..Default::default()
        };
        assert_eq!(
            convert_with(
                "<p><a href=\"https://x.test/\">Click</a> or <a href=\"https://y.test/\">there</a> \
                 or <a href=\"https://x.test/\">again</a></p>",
                options
            ),
            "Click [1] or there [2] or again [1]\n\n\nLinks:\n------\n[1] https://x.test/\n[2] https://y.test/\n"
        );
    }

    #[test]
    fn test_preformatted_spacing_survives() {
        assert_eq!(convert("<pre>a   b\nc</pre>"), "a\u{a0}\u{a0}\u{a0}b\nc\n");
    }

    #[test]
    fn test_deleted_text() {
        assert_eq!(convert("<del>old</del>"), "o\u{336}l\u{336}d\u{336}");
    }

    #[test]
    fn test_list() {
        assert_eq!(
            convert("<p>Items:</p><ul><li>one</li><li>two</li></ul>"),
            "Items:\n\n\t* one\n\t* two\n\n"
        );
    }

    #[test]
    fn test_entities() {
        assert_eq!(
            convert("Fish &amp;amp; chips &copy; &bogus; 5&#153;"),
            "Fish &amp; chips \u{a9}  5\u{2122}"
        );
    }

    #[test]
    fn test_horizontal_rule_unlimited_width() {
        assert_eq!(
            convert_with("a<hr>b", unlimited()),
            format!("a\n\n{}\n\nb", "-".repeat(25))
        );
    }

    #[test]
    fn test_wraps_to_width() {
        let options = ConversionOptions {
            width: 10,
            ..Default::default()
        };
        assert_eq!(
            convert_with("<p>one two three four</p>", options),
            "one two\nthree four\n"
        );
    }

    #[test]
    fn test_nested_quotes() {
        // Marker spaces come out as no-break spaces from the preformatted pass
        assert_eq!(
            convert("<blockquote>outer<blockquote>inner</blockquote></blockquote>"),
            ">\u{a0}outer\n>\u{a0}\n>>\u{a0}\u{a0}inner\n"
        );
    }

    #[test]
    fn test_context_links_shared_with_quotes() {
        let options = ConversionOptions {
            links: LinkMode::Table,
            ..Default::default()
        };
        let converter = PlaintextConverter::with_options(options);
        let mut ctx = ConversionContext::new(Duration::ZERO);
        let text = converter
            .convert_with_context(
                "<blockquote><a href=\"https://q.test/\">quoted</a></blockquote>\
                 <a href=\"https://q.test/\">again</a>",
                &mut ctx,
            )
            .unwrap();
        assert_eq!(ctx.links().len(), 1);
        assert!(text.contains("again [1]"));
        assert!(text.ends_with("[1] https://q.test/\n"));
    }

    #[test]
    fn test_input_too_large() {
        let converter = PlaintextConverter::new().with_limits(InputLimits {
            max_input_size: 10,
            ..InputLimits::default()
        });
        match converter.convert("<p>01234567890</p>") {
            Err(ConversionError::InputTooLarge { size: 18, limit: 10 }) => (),
            other => panic!("Expected InputTooLarge, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_bytes_with_declared_charset() {
        let converter = PlaintextConverter::with_options(unlimited());
        let text = converter
            .convert_bytes(b"<p>caf\xe9</p>", Some("text/html; charset=iso-8859-1"), Some("msg-1"))
            .unwrap();
        assert_eq!(text, "caf\u{e9}\n");
    }

    #[test]
    fn test_convert_bytes_invalid_utf8() {
        let result = PlaintextConverter::new().convert_bytes(b"<p>\xff</p>", None, None);
        assert!(matches!(result, Err(ConversionError::EncodingError(_))));
    }

    #[test]
    fn test_converter_limits_apply_to_supplied_context() {
        let converter =
            PlaintextConverter::new().with_limits(InputLimits::with_max_quote_depth(1));
        let mut ctx = ConversionContext::new(Duration::ZERO);
        match converter.convert_with_context(
            "<blockquote><blockquote>x</blockquote></blockquote>",
            &mut ctx,
        ) {
            Err(ConversionError::NestingTooDeep { depth: 2, limit: 1 }) => (),
            other => panic!("Expected NestingTooDeep, got: {:?}", other),
        }
        assert_eq!(ctx.quote_depth(), 0);
    }

    #[test]
    fn test_context_depth_tracking() {
        let mut ctx = ConversionContext::new(Duration::ZERO)
            .with_limits(InputLimits::with_max_quote_depth(1));
        ctx.enter_quote().unwrap();
        assert_eq!(ctx.quote_depth(), 1);
        assert!(ctx.enter_quote().is_err());
        assert_eq!(ctx.quote_depth(), 1);
        ctx.leave_quote();
        ctx.leave_quote();
        assert_eq!(ctx.quote_depth(), 0);
    }

    #[test]
    fn test_checkpoint_counting() {
        let mut ctx = ConversionContext::new(Duration::from_secs(60));
        for _ in 0..250 {
            ctx.increment_and_check().unwrap();
        }
        assert_eq!(ctx.checkpoint_count(), 250);
    }
}

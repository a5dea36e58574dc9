//! Static substitution table
//!
//! The first rewrite stage: an ordered list of pattern → fixed replacement
//! rules applied one after another over the whole text. The order matters.
//! Line breaks and tabs are flattened to spaces before anything else, so every
//! line break in the output is reintroduced deliberately by a later rule.
//! Container rules run before item rules (`<li>…</li>` before a bare `<li>`).
//!
//! Besides standard HTML this table understands the MJML mail markup
//! vocabulary (`mj-table`, `mj-divider`, `mj-spacer`, `mj-social`) and the
//! `plaintext:hidden` marker class, which drops an element from the plaintext
//! rendering entirely.

use std::borrow::Cow;

use regex::NoExpand;

use crate::error::ConversionError;
use crate::options::ConversionOptions;
use crate::pattern::Pattern;

/// Replacement applied by one substitution rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replacement {
    /// Delete the match
    Remove,
    /// Fixed text, inserted verbatim
    Literal(&'static str),
    /// Text with `${n}` capture references
    Template(&'static str),
    /// Horizontal rule sized to the effective width
    Rule,
    /// `[alt]` when image alt text is enabled, nothing otherwise
    ImageAlt,
}

struct Substitution {
    pattern: Pattern,
    replacement: Replacement,
}

const fn rule(source: &'static str, replacement: Replacement) -> Substitution {
    Substitution {
        pattern: Pattern::new(source),
        replacement,
    }
}

static SUBSTITUTIONS: [Substitution; 33] = [
    // Carriage returns, then runs of newlines/tabs
    rule(r"\r", Replacement::Remove),
    rule(r"[\n\t]+", Replacement::Literal(" ")),
    // Non-content blocks
    rule(r"(?i)<head\b[^>]*>.*?</head>", Replacement::Remove),
    rule(r"(?i)<script\b[^>]*>.*?</script>", Replacement::Remove),
    rule(r"(?i)<style\b[^>]*>.*?</style>", Replacement::Remove),
    // Elements carrying the hidden marker class
    rule(
        r#"(?i)<mj-[^>]*?css-class="[^"]*?plaintext:hidden[^>]*?>.+?</mj-[^>]*>"#,
        Replacement::Remove,
    ),
    rule(
        r#"(?i)<p[^>]*?class="[^"]*?plaintext:hidden[^>]*?>.+?</p>"#,
        Replacement::Remove,
    ),
    rule(
        r#"(?i)<span[^>]*?class="[^"]*?plaintext:hidden[^>]*?>.+?</span>"#,
        Replacement::Remove,
    ),
    rule(
        r#"(?i)<div[^>]*?class="[^"]*?plaintext:hidden[^>]*?>.+?</div>"#,
        Replacement::Remove,
    ),
    rule(
        r#"(?i)<table[^>]*?class="[^"]*?plaintext:hidden[^>]*?>.+?</table>"#,
        Replacement::Remove,
    ),
    rule(
        r#"(?i)<tr[^>]*?class="[^"]*?plaintext:hidden[^>]*?>.+?</tr>"#,
        Replacement::Remove,
    ),
    rule(
        r#"(?i)<td[^>]*?class="[^"]*?plaintext:hidden[^>]*?>.*?</td>"#,
        Replacement::Remove,
    ),
    // Italic, emphasis and inserted text
    rule(r"(?i)<i\b[^>]*>(.*?)</i>", Replacement::Template("_${1}_")),
    rule(r"(?i)<em\b[^>]*>(.*?)</em>", Replacement::Template("_${1}_")),
    rule(r"(?i)<ins\b[^>]*>(.*?)</ins>", Replacement::Template("_${1}_")),
    // Lists and definition lists
    rule(r"(?i)<ul\b[^>]*>|</ul>", Replacement::Literal("\n\n")),
    rule(r"(?i)<ol\b[^>]*>|</ol>", Replacement::Literal("\n\n")),
    rule(r"(?i)<dl\b[^>]*>|</dl>", Replacement::Literal("\n\n")),
    rule(r"(?i)<li\b[^>]*>(.*?)</li>", Replacement::Template("\t* ${1}\n")),
    rule(r"(?i)<dd\b[^>]*>(.*?)</dd>", Replacement::Template(" ${1}\n")),
    rule(r"(?i)<dt\b[^>]*>(.*?)</dt>", Replacement::Template("\t* ${1}")),
    rule(r"(?i)<li\b[^>]*>", Replacement::Literal("\n\t* ")),
    // Rules and block boundaries
    rule(r"(?i)<hr\b[^>]*>", Replacement::Rule),
    rule(r"(?i)<div\b[^>]*>", Replacement::Literal("<div>\n")),
    rule(r"(?i)<table\b[^>]*>|</table>", Replacement::Literal("\n\n")),
    rule(r"(?i)<tr\b[^>]*>|</tr>", Replacement::Literal("\n")),
    rule(r"(?i)<td\b[^>]*>(.*?)</td>", Replacement::Template("\t\t${1}\n")),
    // Images with alt text
    rule(r#"(?i)<img\b[^>]*alt="([^>"]+)"[^>]*>"#, Replacement::ImageAlt),
    // Mail markup
    rule(r"(?i)<outlook\b[^>]*>.*?</outlook>", Replacement::Remove),
    rule(r"(?i)<mj-table\b[^>]*>|</mj-table>", Replacement::Literal("\n\n")),
    rule(r"(?i)<mj-divider\b[^>]*>", Replacement::Rule),
    rule(r"(?i)<mj-spacer\b[^>]*>", Replacement::Literal("&nbsp;\n\n&nbsp;")),
    rule(r"(?i)<mj-social\b[^>]*>.*?</mj-social>", Replacement::Remove),
];

/// Render a horizontal rule for the given options
pub fn horizontal_rule(options: &ConversionOptions) -> String {
    format!("\n\n{}\n\n", "-".repeat(options.rule_width()))
}

/// Apply the static substitution table in order
///
/// # Examples
///
/// ```rust
/// use plaintext_converter::options::ConversionOptions;
/// use plaintext_converter::rules::apply_substitutions;
///
/// let text = apply_substitutions("<ul><li>one</li><li>two</li></ul>", &ConversionOptions::default())
///     .unwrap();
/// assert_eq!(text, "\n\n\t* one\n\t* two\n\n\n");
/// ```
pub fn apply_substitutions(
    text: &str,
    options: &ConversionOptions,
) -> Result<String, ConversionError> {
    let rule_text = horizontal_rule(options);
    let image_template = if options.image_alt_text { "[${1}]" } else { "" };
    let mut text = Cow::Borrowed(text);

    for substitution in &SUBSTITUTIONS {
        let regex = substitution.pattern.get()?;
        let replaced = match substitution.replacement {
            Replacement::Remove => regex.replace_all(&text, NoExpand("")),
            Replacement::Literal(literal) => regex.replace_all(&text, NoExpand(literal)),
            Replacement::Template(template) => regex.replace_all(&text, template),
            Replacement::Rule => regex.replace_all(&text, NoExpand(rule_text.as_str())),
            Replacement::ImageAlt => regex.replace_all(&text, image_template),
        };
        if let Cow::Owned(replaced) = replaced {
            text = Cow::Owned(replaced);
        }
    }

    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(html: &str) -> String {
        apply_substitutions(html, &ConversionOptions::default()).unwrap()
    }

    #[test]
    fn test_newlines_and_tabs_flatten() {
        assert_eq!(apply("a\r\n\tb\n\nc"), "a b c");
    }

    #[test]
    fn test_non_content_blocks_removed() {
        assert_eq!(apply("<head><title>T</title></head>x"), "x");
        assert_eq!(apply("a<script type=\"x\">alert(1)</script>b"), "ab");
        assert_eq!(apply("a<STYLE>p{}</STYLE>b"), "ab");
    }

    #[test]
    fn test_hidden_marker_class() {
        assert_eq!(apply("<p class=\"lead plaintext:hidden\">secret</p>shown"), "shown");
        assert_eq!(apply("<span class=\"plaintext:hidden\">x</span>y"), "y");
        assert_eq!(
            apply("<mj-text css-class=\"plaintext:hidden\">web only</mj-text>mail"),
            "mail"
        );
        assert_eq!(apply("<td class=\"plaintext:hidden\"></td>"), "");
        assert_eq!(apply("<div class=\"box plaintext:hidden\">web only</div>mail"), "mail");
        assert_eq!(
            apply("<table class=\"plaintext:hidden\"><tr><td>a</td></tr></table>b"),
            "b"
        );
        assert_eq!(apply("<tr class=\"plaintext:hidden\"><td>a</td></tr>b"), "b");
    }

    #[test]
    fn test_emphasis_underscores() {
        assert_eq!(apply("<i>a</i> <em>b</em> <ins>c</ins>"), "_a_ _b_ _c_");
    }

    #[test]
    fn test_definition_list() {
        assert_eq!(apply("<dl><dt>Term</dt><dd>Meaning</dd></dl>"), "\n\n\t* Term Meaning\n\n\n");
    }

    #[test]
    fn test_unclosed_list_item() {
        assert_eq!(apply("<li>one"), "\n\t* one");
    }

    #[test]
    fn test_horizontal_rule_width() {
        let options = ConversionOptions {
            width: 10,
            ..Default::default()
        };
        assert_eq!(
            apply_substitutions("<hr/>", &options).unwrap(),
            "\n\n----------\n\n"
        );
    }

    #[test]
    fn test_horizontal_rule_unlimited_width_uses_fallback() {
        let options = ConversionOptions {
            width: 0,
            ..Default::default()
        };
        assert_eq!(
            apply_substitutions("<mj-divider />", &options).unwrap(),
            format!("\n\n{}\n\n", "-".repeat(25))
        );
    }

    #[test]
    fn test_table_cells() {
        assert_eq!(
            apply("<table><tr><td>a</td><td>b</td></tr></table>"),
            "\n\n\n\t\ta\n\t\tb\n\n\n\n"
        );
    }

    #[test]
    fn test_image_alt_text() {
        assert_eq!(apply("<img src=\"x.png\" alt=\"Logo\">"), "[Logo]");

        let options = ConversionOptions {
            image_alt_text: false,
            ..Default::default()
        };
        assert_eq!(
            apply_substitutions("<img src=\"x.png\" alt=\"Logo\">", &options).unwrap(),
            ""
        );
    }

    #[test]
    fn test_mail_markup() {
        assert_eq!(apply("a<outlook>legacy</outlook>b"), "ab");
        assert_eq!(apply("<mj-spacer height=\"20px\" />"), "&nbsp;\n\n&nbsp;");
        assert_eq!(apply("a<mj-social><mj-social-element/></mj-social>b"), "ab");
        assert_eq!(apply("<mj-table>x</mj-table>"), "\n\nx\n\n");
    }

    #[test]
    fn test_div_opens_line() {
        assert_eq!(apply("<div class=\"c\">x</div>"), "<div>\nx</div>");
    }
}

//! Callback-dispatched tag rewriting
//!
//! The second rewrite stage. Each rule pairs a pattern with a [`TagKind`];
//! every match of the pattern is handed to the renderer for that kind. Rules
//! run one after another in declaration order, so e.g. headings are already
//! uppercased before anchors inside them are rendered as links.

use regex::Captures;

use crate::converter::ConversionContext;
use crate::entities::trim_markup;
use crate::error::ConversionError;
use crate::links::LinkList;
use crate::options::{ConversionOptions, LinkMode};
use crate::pattern::{Pattern, group, try_replace_all};
use crate::transform::{strikethrough, upper_preserving_tags};

/// Tag construct handled by a callback rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<h1>` to `<h6>`
    Heading,
    /// Mail markup element carrying the `plaintext:uppercase` class
    UppercaseBlock,
    Paragraph,
    LineBreak,
    Bold,
    Strong,
    Deleted,
    TableHeader,
    /// `<a href>`
    Anchor,
    /// `<mj-button href>`
    Button,
    /// `<mj-navbar base-url>`
    NavbarWithBase,
    Navbar,
    /// `<mj-image>`
    Image,
    /// `<mj-carousel-image>`
    CarouselImage,
}

struct CallbackRule {
    kind: TagKind,
    pattern: Pattern,
}

const fn callback(kind: TagKind, source: &'static str) -> CallbackRule {
    CallbackRule {
        kind,
        pattern: Pattern::new(source),
    }
}

static CALLBACK_RULES: [CallbackRule; 14] = [
    callback(TagKind::Heading, r"(?i)<h[1-6](?: [^>]*)?>(.*?)</h[1-6]>"),
    callback(
        TagKind::UppercaseBlock,
        r#"(?i)<mj-[^>]*?css-class="[^"]*?plaintext:uppercase[^>]*?>(.*?)</mj-[^>]*>"#,
    ),
    callback(TagKind::Paragraph, r"(?is)[ ]*<p(?: [^>]*)?>(.*?)</p>[ ]*"),
    callback(TagKind::LineBreak, r"(?i)<br[^>]*>[ ]*"),
    callback(TagKind::Bold, r"(?i)<b(?: [^>]*)?>(.*?)</b>"),
    callback(TagKind::Strong, r"(?i)<strong(?: [^>]*)?>(.*?)</strong>"),
    callback(TagKind::Deleted, r"(?i)<del(?: [^>]*)?>(.*?)</del>"),
    callback(TagKind::TableHeader, r"(?i)<th(?: [^>]*)?>(.*?)</th>"),
    callback(
        TagKind::Anchor,
        r#"(?i)<a [^>]*href=(?:"([^"']+)"|'([^"']+)')([^>]*)>(.*?)</a>"#,
    ),
    callback(
        TagKind::Button,
        r#"(?i)<mj-button [^>]*href=(?:"([^"']+)"|'([^"']+)')([^>]*)>(.*?)</mj-button>"#,
    ),
    callback(
        TagKind::NavbarWithBase,
        r#"(?i)<mj-navbar [^>]*base-url=["']([^"']+)["'][^>]*>(.*?)</mj-navbar>"#,
    ),
    callback(TagKind::Navbar, r"(?i)<mj-navbar(?:\s[^>]*)?>(.*?)</mj-navbar>"),
    callback(TagKind::Image, r"(?i)<mj-image\s([^>]*)>"),
    callback(TagKind::CarouselImage, r"(?i)<mj-carousel-image\s([^>]*)>"),
];

static LINK_OVERRIDE: Pattern = Pattern::new(r"_html2text_link_(\w+)");
static NAVBAR_ITEM: Pattern =
    Pattern::new(r#"(?i)<mj-navbar-link[^>]*href=(?:"([^"']+)"|'([^"']+)')[^>]*>(.*)"#);
static ALT_ATTRIBUTE: Pattern = Pattern::new(r#"alt="([^"]*)""#);
static HREF_ATTRIBUTE: Pattern = Pattern::new(r#"href="([^"]*)""#);

const NAVBAR_ITEM_DELIMITER: &str = "</mj-navbar-link>";

/// Run every callback rule over `text`, in order
///
/// Links are rendered through the context's link list, so table mode indices
/// keep counting across calls sharing one context.
pub fn apply_callbacks(
    text: &str,
    options: &ConversionOptions,
    ctx: &mut ConversionContext,
) -> Result<String, ConversionError> {
    let mut text = text.to_string();

    for rule in &CALLBACK_RULES {
        let regex = rule.pattern.get()?;
        if !regex.is_match(&text) {
            continue;
        }
        text = try_replace_all(regex, &text, |caps| {
            ctx.increment_and_check()?;
            render(rule.kind, caps, options, ctx.links_mut())
        })?;
    }

    Ok(text)
}

fn render(
    kind: TagKind,
    caps: &Captures<'_>,
    options: &ConversionOptions,
    links: &mut LinkList,
) -> Result<String, ConversionError> {
    match kind {
        TagKind::Heading | TagKind::UppercaseBlock => {
            upper_preserving_tags(&format!("\n\n{}\n\n", group(caps, 1)))
        }
        TagKind::Paragraph => {
            let paragraph = group(caps, 1).replace('\n', " ");
            Ok(format!("\n{}\n", trim_markup(&paragraph)))
        }
        TagKind::LineBreak => Ok("\n".to_string()),
        TagKind::Bold | TagKind::Strong => upper_preserving_tags(group(caps, 1)),
        TagKind::Deleted => Ok(strikethrough(group(caps, 1))),
        TagKind::TableHeader => upper_preserving_tags(&format!("\t\t{}\n", group(caps, 1))),
        TagKind::Anchor | TagKind::Button => {
            let url = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            let mode_override = link_override(group(caps, 3))?;
            let newline = kind == TagKind::Button;
            Ok(links.render(options.links, url, group(caps, 4), mode_override, newline))
        }
        TagKind::NavbarWithBase => {
            render_navbar(trim_markup(group(caps, 1)), group(caps, 2), options, links)
        }
        TagKind::Navbar => render_navbar("", group(caps, 1), options, links),
        TagKind::Image | TagKind::CarouselImage => render_image(group(caps, 1), options, links),
    }
}

/// Link mode requested by a `_html2text_link_<mode>` token in the attributes
/// following `href`
fn link_override(attributes: &str) -> Result<Option<LinkMode>, ConversionError> {
    Ok(LINK_OVERRIDE
        .get()?
        .captures(attributes)
        .map(|caps| LinkMode::from_override(group(&caps, 1))))
}

fn render_navbar(
    base_url: &str,
    content: &str,
    options: &ConversionOptions,
    links: &mut LinkList,
) -> Result<String, ConversionError> {
    let item = NAVBAR_ITEM.get()?;
    let mut rendered = String::new();
    let mut has_links = false;

    for chunk in content.split(NAVBAR_ITEM_DELIMITER) {
        let Some(caps) = item.captures(chunk) else {
            continue;
        };
        has_links = true;
        let href = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        let url = format!("{base_url}{href}");
        rendered.push_str(&links.render(options.links, &url, group(&caps, 3), None, true));
    }

    if !has_links {
        return Ok(String::new());
    }
    Ok(format!("\n\n{rendered}\n\n"))
}

fn render_image(
    attributes: &str,
    options: &ConversionOptions,
    links: &mut LinkList,
) -> Result<String, ConversionError> {
    let alt = ALT_ATTRIBUTE
        .get()?
        .captures(attributes)
        .map_or("", |caps| group(&caps, 1));
    let href = HREF_ATTRIBUTE
        .get()?
        .captures(attributes)
        .map_or("", |caps| group(&caps, 1));

    let display = if alt.is_empty() {
        href.to_string()
    } else {
        format!("[{alt}]")
    };

    if !href.is_empty() && (options.image_alt_text || options.links.is_enabled()) {
        return Ok(links.render(options.links, href, &display, None, true));
    }
    if alt.is_empty() || !options.image_alt_text {
        return Ok(String::new());
    }
    Ok(display)
}

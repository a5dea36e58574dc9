//! Link rendering across modes, overrides and link-bearing mail markup

use plaintext_converter::{ConversionOptions, LinkMode, PlaintextConverter};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn convert_in(mode: LinkMode, html: &str) -> String {
    PlaintextConverter::with_options(ConversionOptions {
        links: mode,
        width: 0,
        ..Default::default()
    })
    .convert(html)
    .expect("Failed to convert")
}

const ANCHOR: &str = "<a href=\"https://x.test/\">Click</a>";

#[test]
fn test_every_mode() {
    assert_eq!(convert_in(LinkMode::Off, ANCHOR), "Click");
    assert_eq!(convert_in(LinkMode::Inline, ANCHOR), "Click [https://x.test/]");
    assert_eq!(convert_in(LinkMode::NextLine, ANCHOR), "Click\n[https://x.test/]");
    assert_eq!(convert_in(LinkMode::BbCode, ANCHOR), "[url=https://x.test/]Click[/url]");
    assert_eq!(
        convert_in(LinkMode::Table, ANCHOR),
        "Click [1]\n\nLinks:\n------\n[1] https://x.test/\n"
    );
}

#[test]
fn test_text_equal_to_url_not_repeated() {
    let html = "<a href=\"https://x.test/\">https://x.test/</a>";
    assert_eq!(convert_in(LinkMode::Inline, html), "https://x.test/");
    assert_eq!(convert_in(LinkMode::NextLine, html), "https://x.test/");
}

#[test]
fn test_ignored_schemes_never_listed() {
    let html = concat!(
        "<a href=\"mailto:team@x.test\">Mail</a> ",
        "<a href=\"JavaScript:void(0)\">JS</a> ",
        "<a href=\"tel:+4912345\">Call</a> ",
        "<a href=\"#top\">Top</a>",
    );
    let text = convert_in(LinkMode::Table, html);
    assert_eq!(text, "Mail JS Call Top");
    assert!(!text.contains("Links:"));
}

#[test]
fn test_override_token_wins_for_one_link() {
    let html = concat!(
        "<a href=\"https://x.test/\" class=\"_html2text_link_table\">Listed</a> ",
        "<a href=\"https://y.test/\">Plain</a>",
    );
    assert_eq!(
        convert_in(LinkMode::Off, html),
        "Listed [1] Plain\n\nLinks:\n------\n[1] https://x.test/\n"
    );
}

#[test]
fn test_spaces_removed_from_url() {
    assert_eq!(
        convert_in(LinkMode::Inline, "<a href=\"https://x.test/a b\">x</a>"),
        "x [https://x.test/ab]"
    );
}

#[test]
fn test_button_in_table_mode() {
    assert_eq!(
        convert_in(
            LinkMode::Table,
            "<mj-button href=\"https://x.test/buy\">Buy</mj-button>"
        ),
        "Buy [1]\n\n\nLinks:\n------\n[1] https://x.test/buy\n"
    );
}

#[test]
fn test_navbar_joins_base_url() {
    let html = concat!(
        "<mj-navbar base-url=\"https://shop.test\">",
        "<mj-navbar-link href=\"/a\">A</mj-navbar-link>",
        "<mj-navbar-link href=\"/b\">B</mj-navbar-link>",
        "</mj-navbar>",
    );
    assert_eq!(
        convert_in(LinkMode::Inline, html),
        "A [https://shop.test/a]\nB [https://shop.test/b]\n\n"
    );
}

#[test]
fn test_image_link_uses_alt_as_text() {
    let html = "<mj-image src=\"banner.png\" alt=\"Sale\" href=\"https://x.test/sale\" />";
    assert_eq!(
        convert_in(LinkMode::Table, html),
        "[Sale] [1]\n\n\nLinks:\n------\n[1] https://x.test/sale\n"
    );
    assert_eq!(
        convert_in(LinkMode::Off, html),
        "[Sale]\n"
    );
}

#[test]
fn test_image_link_without_alt_shows_url() {
    let html = "<mj-carousel-image src=\"a.png\" href=\"https://x.test/a\" />";
    assert_eq!(convert_in(LinkMode::Inline, html), "https://x.test/a\n");
}

proptest! {
    #[test]
    fn prop_table_indices_are_first_seen_order(picks in prop::collection::vec(0usize..4, 1..20)) {
        let urls: Vec<String> = (0..4).map(|i| format!("https://site{i}.test/")).collect();
        let html: Vec<String> = picks
            .iter()
            .map(|&i| format!("<a href=\"{}\">t</a>", urls[i]))
            .collect();

        let mut first_seen: Vec<usize> = Vec::new();
        let mut body = Vec::new();
        for &pick in &picks {
            if !first_seen.contains(&pick) {
                first_seen.push(pick);
            }
            let index = first_seen.iter().position(|&p| p == pick).unwrap() + 1;
            body.push(format!("t [{index}]"));
        }
        let mut expected = body.join(" ");
        expected.push_str("\n\nLinks:\n------\n");
        for (i, &pick) in first_seen.iter().enumerate() {
            expected.push_str(&format!("[{}] {}\n", i + 1, urls[pick]));
        }

        prop_assert_eq!(convert_in(LinkMode::Table, &html.join(" ")), expected);
    }
}
